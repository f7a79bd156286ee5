//! Narration cleanup for markdown scripture fragments.
//!
//! Cleaning is an ordered list of rewrite passes. Later passes assume earlier
//! ones already ran: the link pass only sees `[[...]]` spans whose lexicon
//! tokens are gone, and the annotation pass only sees single brackets.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// A named rewrite pass.
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

/// Rewrite passes, in the order they are applied.
pub const RULES: &[Rule] = &[
    Rule { name: "lexicon", apply: strip_lexicon_refs },
    Rule { name: "dangling-lexicon", apply: strip_dangling_lexicon },
    Rule { name: "wiki-link", apply: strip_wiki_links },
    Rule { name: "annotation", apply: unwrap_annotations },
    Rule { name: "navigation", apply: strip_navigation },
    Rule { name: "emphasis", apply: unwrap_emphasis },
    Rule { name: "whitespace", apply: collapse_whitespace },
];

/// Glyphs used for chapter navigation and list bullets.
const NAV_GLYPHS: &[char] = &['←', '→', '↑', '↓', '↔', '⇐', '⇒', '•', '‣', '◦'];

static LEXICON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[G\d+\]\]").expect("valid regex"));

static DANGLING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[G\d*|\]\]").expect("valid regex"));

static WIKI_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[[^\]]+\]\]").expect("valid regex"));

// A `[[...]]` span with no bracket inside, so an open `[[G12` never starts one
static CLOSED_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[[^\[\]]+\]\]").expect("valid regex"));

static ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\](\([^)]+\))?").expect("valid regex"));

static RULE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{3,}").expect("valid regex"));

static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"));

static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("valid regex"));

static MD_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Clean a raw fragment into narration-safe plain text.
///
/// Never fails; text that is nothing but markup comes back empty. The pass
/// list is re-run until the text stops changing, so a removal that brings two
/// brackets together is cleaned as well.
pub fn clean_text(text: &str) -> String {
    let mut current = apply_rules(text);
    loop {
        let next = apply_rules(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn apply_rules(text: &str) -> String {
    RULES.iter().fold(text.to_string(), |acc, rule| {
        let next = (rule.apply)(&acc);
        if next != acc {
            log::trace!("{}: {:?} -> {:?}", rule.name, acc, next);
        }
        next
    })
}

/// `[[G1234]]` lexicon references.
fn strip_lexicon_refs(text: &str) -> String {
    LEXICON_RE.replace_all(text, "").into_owned()
}

/// Truncated lexicon remnants: an open `[[G12` or a bare `]]`.
///
/// Complete `[[...]]` spans are left for the link pass so a link such as
/// `[[Genesis 2|next]]` is removed whole instead of being torn apart here.
fn strip_dangling_lexicon(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last = 0;

    for span in CLOSED_SPAN_RE.find_iter(text) {
        result.push_str(&DANGLING_RE.replace_all(&text[last..span.start()], ""));
        result.push_str(span.as_str());
        last = span.end();
    }
    result.push_str(&DANGLING_RE.replace_all(&text[last..], ""));

    result
}

/// Footnote, cross-reference and navigation links: `[[target]]`, `[[label|target]]`.
fn strip_wiki_links(text: &str) -> String {
    WIKI_LINK_RE.replace_all(text, "").into_owned()
}

/// Supplied-word markers `[word]` are read as the word itself.
fn unwrap_annotations(text: &str) -> String {
    ANNOTATION_RE
        .replace_all(text, |caps: &Captures| {
            // `[text](url)` is a hyperlink, unwrapped by the emphasis pass
            if caps.get(2).is_some() {
                caps[0].to_string()
            } else {
                caps[1].to_string()
            }
        })
        .into_owned()
}

/// Navigation arrows, bullets and `---` rule separators.
fn strip_navigation(text: &str) -> String {
    let without_glyphs: String = text.chars().filter(|c| !NAV_GLYPHS.contains(c)).collect();
    RULE_LINE_RE.replace_all(&without_glyphs, "").into_owned()
}

/// Bold, italic and `[text](url)` hyperlinks.
fn unwrap_emphasis(text: &str) -> String {
    let text = BOLD_RE.replace_all(text, "$1");
    let text = ITALIC_RE.replace_all(&text, "$1");
    MD_LINK_RE.replace_all(&text, "$1").into_owned()
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rule_order() {
        let names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "lexicon",
                "dangling-lexicon",
                "wiki-link",
                "annotation",
                "navigation",
                "emphasis",
                "whitespace"
            ]
        );
    }

    #[test]
    fn test_removes_lexicon_refs() {
        let cleaned = clean_text("In the beginning[[G746]] was the Word[[G3056]].");
        assert_eq!(cleaned, "In the beginning was the Word.");
    }

    #[test]
    fn test_removes_truncated_lexicon() {
        assert_eq!(clean_text("the Word [[G30"), "the Word");
        assert_eq!(clean_text("56]] was God"), "56 was God");
        assert_eq!(clean_text("light [[G"), "light");
    }

    #[test]
    fn test_removes_wiki_links_whole() {
        assert_eq!(clean_text("[[Genesis 1|←]] | [[Genesis 3|→]]"), "|");
        assert_eq!(clean_text("see [[Exodus 3]] now"), "see now");
        assert_eq!(clean_text("note[[#fn1]] here"), "note here");
    }

    #[test]
    fn test_unwraps_supplied_words() {
        assert_eq!(clean_text("and [there] was light"), "and there was light");
        assert_eq!(
            clean_text("In [the] beginning [[G123]] God created."),
            "In the beginning God created."
        );
    }

    #[test]
    fn test_unwraps_markdown_links() {
        assert_eq!(
            clean_text("read [the notes](https://example.org/notes) first"),
            "read the notes first"
        );
    }

    #[test]
    fn test_truncated_lexicon_before_link_keeps_words() {
        assert_eq!(clean_text("[[G12 and [[Exodus 3]] done"), "and done");
        assert_eq!(clean_text("[[G7 he said [[Genesis 2|→]]"), "he said");
    }

    #[test]
    fn test_bracket_before_unfinished_parenthesis_is_unwrapped() {
        assert_eq!(clean_text("[He]("), "He(");
        assert_eq!(clean_text("say [note](see below"), "say note(see below");
        assert_eq!(clean_text("[He]() went"), "He() went");
    }

    #[test]
    fn test_strips_navigation() {
        assert_eq!(clean_text("← Previous • Next →"), "Previous Next");
        assert_eq!(clean_text("-----"), "");
        assert_eq!(clean_text("well-known -- text"), "well-known -- text");
    }

    #[test]
    fn test_glyph_between_dashes_leaves_nothing() {
        assert_eq!(clean_text("-→--"), "");
    }

    #[test]
    fn test_unwraps_emphasis() {
        assert_eq!(clean_text("**Jesus** wept"), "Jesus wept");
        assert_eq!(clean_text("a *quiet* voice"), "a quiet voice");
        assert_eq!(clean_text("***loud***"), "loud");
    }

    #[test]
    fn test_brackets_joined_by_removal() {
        assert_eq!(clean_text("][[ab]]]"), "");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(clean_text("  one\n\ttwo   three \n"), "one two three");
    }

    #[test]
    fn test_markup_only_is_empty() {
        assert_eq!(clean_text("[[G1]] [[Genesis 2|→]] ---"), "");
        assert_eq!(clean_text(""), "");
    }

    fn fragment() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z]{1,8}",
            "[0-9]{1,4}".prop_map(|d| format!("[[G{}]]", d)),
            "[a-z]{1,6}".prop_map(|w| format!("[{}]", w)),
            "[a-z]{1,6}".prop_map(|w| format!("**{}**", w)),
            "[a-z]{1,6}".prop_map(|w| format!("*{}*", w)),
            "[A-Z][a-z]{1,6} [0-9]{1,3}".prop_map(|l| format!("[[{}|→]]", l)),
            "[a-z]{1,6}".prop_map(|w| format!("[{}](https://example.org/{})", w, w)),
            Just("←".to_string()),
            Just("•".to_string()),
            Just("----".to_string()),
            Just("\n".to_string()),
            Just(",".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn prop_clean_is_idempotent(parts in prop::collection::vec(fragment(), 0..12)) {
            let text = parts.join(" ");
            let once = clean_text(&text);
            prop_assert_eq!(clean_text(&once), once);
        }

        #[test]
        fn prop_lexicon_tokens_leave_no_brackets(
            before in "[a-zA-Z ,.]{0,20}",
            digits in "[0-9]{1,5}",
            after in "[a-zA-Z ,.]{0,20}",
        ) {
            let text = format!("{}[[G{}]]{}", before, digits, after);
            let cleaned = clean_text(&text);
            prop_assert!(!cleaned.contains('['));
            prop_assert!(!cleaned.contains(']'));
            let token = format!("G{}", digits);
            prop_assert!(!cleaned.contains(&token));
        }

        #[test]
        fn prop_arbitrary_text_is_idempotent(text in "[a-zA-Z\\[\\]\\*\\-→ \n]{0,40}") {
            let once = clean_text(&text);
            prop_assert_eq!(clean_text(&once), once);
        }
    }
}
