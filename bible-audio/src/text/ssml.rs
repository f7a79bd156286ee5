//! SSML document assembly for one chapter.

use super::Verse;

/// XML metacharacters and their entities. Ampersand must come first so the
/// entities added by later replacements are not escaped again.
const XML_ESCAPES: &[(&str, &str)] = &[
    ("&", "&amp;"),
    ("<", "&lt;"),
    (">", "&gt;"),
    ("\"", "&quot;"),
    ("'", "&apos;"),
];

/// The narration read aloud: `"{title}."` followed by every verse text.
/// Verse numbers are not spoken.
pub fn narration_text(title: &str, verses: &[Verse]) -> String {
    std::iter::once(format!("{}.", title))
        .chain(verses.iter().map(|v| v.text.clone()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escape text for use as XML character data.
pub fn escape_xml(text: &str) -> String {
    XML_ESCAPES
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Build the synthesis document for a chapter.
///
/// Voice name and rate are passed through unchecked; the speech service is
/// the one that rejects bad values.
pub fn build_ssml(title: &str, verses: &[Verse], voice_name: &str, rate: f32) -> String {
    let text = escape_xml(&narration_text(title, verses));

    format!(
        r#"<speak version="1.0" xmlns="http://www.w3.org/2001/10/synthesis" xml:lang="en-US">
    <voice name="{voice_name}">
        <prosody rate="{rate}">
            {text}
        </prosody>
    </voice>
</speak>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Inverse of `escape_xml`, as an XML parser would decode character data.
    fn unescape_xml(text: &str) -> String {
        XML_ESCAPES
            .iter()
            .rev()
            .fold(text.to_string(), |acc, (from, to)| acc.replace(to, from))
    }

    fn genesis() -> Vec<Verse> {
        vec![
            Verse::new(1, "In the beginning God created."),
            Verse::new(2, "And the earth was formless."),
        ]
    }

    #[test]
    fn test_narration_text() {
        assert_eq!(
            narration_text("Genesis 1", &genesis()),
            "Genesis 1. In the beginning God created. And the earth was formless."
        );
    }

    #[test]
    fn test_narration_without_verses() {
        assert_eq!(narration_text("Obadiah 1", &[]), "Obadiah 1.");
    }

    #[test]
    fn test_build_ssml_template() {
        let ssml = build_ssml("Genesis 1", &genesis(), "en-US-JennyNeural", 0.9);

        assert!(ssml.starts_with(
            r#"<speak version="1.0" xmlns="http://www.w3.org/2001/10/synthesis" xml:lang="en-US">"#
        ));
        assert!(ssml.contains(r#"<voice name="en-US-JennyNeural">"#));
        assert!(ssml.contains(r#"<prosody rate="0.9">"#));
        assert!(ssml.contains(
            "Genesis 1. In the beginning God created. And the earth was formless."
        ));
        assert!(ssml.ends_with("</speak>"));
    }

    #[test]
    fn test_escape_order() {
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
        assert_eq!(escape_xml(r#"say "hi" it's"#), "say &quot;hi&quot; it&apos;s");
        assert_eq!(escape_xml("&lt;"), "&amp;lt;");
    }

    #[test]
    fn test_build_escapes_verse_text() {
        let verses = vec![Verse::new(1, "Cain & Abel said \"<no>\" isn't it")];
        let ssml = build_ssml("Q & A", &verses, "voice", 1.0);
        assert!(ssml.contains(
            "Q &amp; A. Cain &amp; Abel said &quot;&lt;no&gt;&quot; isn&apos;t it"
        ));
    }

    #[test]
    fn test_voice_and_rate_not_validated() {
        let ssml = build_ssml("T", &[], "not a voice", 42.5);
        assert!(ssml.contains(r#"<voice name="not a voice">"#));
        assert!(ssml.contains(r#"<prosody rate="42.5">"#));
    }

    proptest! {
        #[test]
        fn prop_escape_round_trips(text in "[a-zA-Z &<>\"';]{0,60}") {
            let escaped = escape_xml(&text);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
            prop_assert!(!escaped.contains('"'));
            prop_assert!(!escaped.contains('\''));
            prop_assert_eq!(unescape_xml(&escaped), text);
        }
    }
}
