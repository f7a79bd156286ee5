//! Text processing for narration: cleaning, verse extraction, and SSML assembly.

pub mod cleaner;
pub mod ssml;
pub mod verses;

pub use ssml::{build_ssml, narration_text};
pub use verses::extract_verses;

/// One verse of a chapter, ready to be read aloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verse {
    /// Verse number as written in the source marker
    pub number: u32,
    /// Narration-safe text
    pub text: String,
}

impl Verse {
    /// Create a new verse.
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verse_creation() {
        let verse = Verse::new(3, "Let there be light");
        assert_eq!(verse.number, 3);
        assert_eq!(verse.text, "Let there be light");
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let doc = "# Genesis 1\n###### 1\nIn [the] beginning [[G123]] God created.\n###### 2\nAnd the earth was formless.";
        let chapter = extract_verses(doc);
        let ssml = build_ssml(&chapter.title, &chapter.verses, "en-US-JennyNeural", 0.9);

        assert!(ssml.contains(
            "Genesis 1. In the beginning God created. And the earth was formless."
        ));
    }
}
