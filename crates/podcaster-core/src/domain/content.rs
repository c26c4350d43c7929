//! Ingested source content.
//!
//! Pure data type produced by stage 1 and consumed by stage 2.

use serde::{Deserialize, Serialize};

/// Minimum word count required before script generation is attempted.
pub const MIN_CONTENT_WORDS: usize = 100;

/// Maximum accepted source text size in bytes (25 MiB).
pub const MAX_CONTENT_BYTES: u64 = 25 * 1024 * 1024;

/// Plain-text content extracted from a URL, PDF or local file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// UTF-8 body text with boilerplate removed.
    pub text: String,
    /// Title, either extracted or derived from the first line.
    pub title: String,
    /// The source identifier the content came from (URL or path).
    pub source: String,
    /// Whitespace-separated word count of `text`.
    pub word_count: usize,
}

impl Content {
    /// Create content from extracted text, computing the word count.
    pub fn new(text: impl Into<String>, title: impl Into<String>, source: impl Into<String>) -> Self {
        let text = text.into();
        let word_count = text.split_whitespace().count();
        Self {
            text,
            title: title.into(),
            source: source.into(),
            word_count,
        }
    }

    /// Whether the content meets the minimum-length pipeline precondition.
    #[must_use]
    pub const fn is_long_enough(&self) -> bool {
        self.word_count >= MIN_CONTENT_WORDS
    }
}

/// Derive a title from the first non-empty line of `text`, truncated to 80 chars.
///
/// Used when the extractor yields no title of its own.
#[must_use]
pub fn derive_title(text: &str) -> String {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("Untitled");

    if line.chars().count() <= 80 {
        line.to_string()
    } else {
        let truncated: String = line.chars().take(80).collect();
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_is_computed() {
        let content = Content::new("one two three", "T", "s");
        assert_eq!(content.word_count, 3);
        assert!(!content.is_long_enough());
    }

    #[test]
    fn long_enough_at_threshold() {
        let text = vec!["word"; MIN_CONTENT_WORDS].join(" ");
        let content = Content::new(text, "T", "s");
        assert!(content.is_long_enough());
    }

    #[test]
    fn derive_title_skips_blank_lines() {
        assert_eq!(derive_title("\n\n  Hello world\nmore"), "Hello world");
        assert_eq!(derive_title(""), "Untitled");
    }

    #[test]
    fn derive_title_truncates_long_lines() {
        let long = "x".repeat(200);
        assert_eq!(derive_title(&long).chars().count(), 80);
    }
}
