//! Ingestion error types.

use thiserror::Error;

/// Errors raised while turning a source into [`podcaster_core::Content`].
#[derive(Debug, Error)]
pub enum IngestError {
    /// The source string is not a URL, PDF or readable file.
    #[error("invalid source '{0}': not a URL, PDF or readable text file")]
    InvalidSource(String),

    /// Network failure or non-success HTTP status while fetching a URL.
    #[error("fetch of '{url}' failed: {message}")]
    FetchFailed {
        /// The URL that failed.
        url: String,
        /// Status or transport description.
        message: String,
    },

    /// The source yielded no readable content.
    #[error("no readable content extracted from '{0}'")]
    ExtractEmpty(String),

    /// The source exceeds the 25 MiB cap.
    #[error("source '{source_ref}' exceeds the {limit} byte limit")]
    TooLarge {
        /// The offending source.
        source_ref: String,
        /// The configured byte limit.
        limit: u64,
    },

    /// Local file I/O failed.
    #[error("could not read '{path}': {message}")]
    ReadFailed {
        /// The path that failed.
        path: String,
        /// Underlying error text.
        message: String,
    },
}
