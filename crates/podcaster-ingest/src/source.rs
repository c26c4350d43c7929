//! Source-type detection by inspection.

/// What kind of source a string refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// `http://` or `https://` URL.
    Url,
    /// Path ending in `.pdf` (case-insensitive).
    Pdf,
    /// Anything else: a local plain-text file.
    TextFile,
}

impl SourceKind {
    /// Classify a source string.
    #[must_use]
    pub fn detect(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            Self::Url
        } else if source.to_ascii_lowercase().ends_with(".pdf") {
            Self::Pdf
        } else {
            Self::TextFile
        }
    }
}
