//! Verse extraction from chapter markdown.
//!
//! A chapter file carries a `# Title` heading, optional `---` front matter,
//! and verse bodies introduced by `###### N` marker lines.

use super::Verse;
use super::cleaner::clean_text;
use regex::Regex;
use std::sync::LazyLock;

static VERSE_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^######\s+(\d+)\s*$").expect("valid regex"));

const FRONT_MATTER_DELIMITER: &str = "---";

/// Title and verses pulled out of one chapter document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedChapter {
    /// Text of the first `# ` heading, empty if there is none
    pub title: String,
    /// Verses in source order
    pub verses: Vec<Verse>,
}

/// Scanner state: before the first marker, or accumulating a verse body.
#[derive(Debug)]
enum ScanState {
    Outside,
    Inside { number: u32, fragments: Vec<String> },
}

impl ScanState {
    /// State entered by a marker line. Verse 0, or a number too large for
    /// `u32`, is not a verse.
    fn open(number: Option<u32>) -> Self {
        match number {
            Some(number) if number > 0 => ScanState::Inside {
                number,
                fragments: Vec::new(),
            },
            _ => ScanState::Outside,
        }
    }

    /// Close the open verse, yielding it if any text survived cleaning.
    fn flush(self) -> Option<Verse> {
        match self {
            ScanState::Outside => None,
            ScanState::Inside { number, fragments } => {
                // joining can bring split markup back together
                let text = clean_text(&fragments.join(" "));
                (!text.is_empty()).then(|| Verse::new(number, text))
            }
        }
    }

    fn push_line(&mut self, line: &str) {
        if let ScanState::Inside { fragments, .. } = self {
            let cleaned = clean_text(line);
            if !cleaned.is_empty() {
                fragments.push(cleaned);
            }
        }
    }
}

/// Parse a chapter document into its title and ordered verses.
///
/// Verse numbers are taken verbatim from the markers: gaps, repeats and
/// out-of-order numbers are kept as they appear.
pub fn extract_verses(document: &str) -> ExtractedChapter {
    let document = document.trim_start_matches('\u{feff}');
    let title = chapter_title(document);
    let body = strip_front_matter(document);

    let mut verses = Vec::new();
    let mut state = ScanState::Outside;

    for line in body.lines() {
        match verse_marker(line) {
            Some(number) => {
                let previous = std::mem::replace(&mut state, ScanState::open(number));
                verses.extend(previous.flush());
            }
            None => state.push_line(line),
        }
    }
    verses.extend(state.flush());

    ExtractedChapter { title, verses }
}

/// Text of the first top-level heading.
fn chapter_title(document: &str) -> String {
    document
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
        .unwrap_or_default()
}

/// Drop a leading `---` ... `---` block. An unterminated block is kept.
fn strip_front_matter(document: &str) -> &str {
    let mut lines = document.split_inclusive('\n');

    let mut offset = match lines.next() {
        Some(first) if first.trim_end() == FRONT_MATTER_DELIMITER => first.len(),
        _ => return document,
    };

    for line in lines {
        offset += line.len();
        if line.trim_end() == FRONT_MATTER_DELIMITER {
            return &document[offset..];
        }
    }

    document
}

/// Marker line check. The inner value is the verse number, `None` when it
/// does not fit in `u32`.
fn verse_marker(line: &str) -> Option<Option<u32>> {
    VERSE_MARKER_RE
        .captures(line.trim())
        .map(|caps| caps[1].parse().ok())
}
