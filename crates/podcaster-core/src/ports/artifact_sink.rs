//! Artifact sink port: publishes the final episode and yields a public URL.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by [`ArtifactSink::upload`].
#[derive(Debug, Error)]
pub enum SinkError {
    /// The local artifact could not be read.
    #[error("failed to read artifact {path}: {message}")]
    ReadFailed {
        /// Local path that failed.
        path: String,
        /// Underlying error text.
        message: String,
    },

    /// The remote store rejected or failed the upload.
    #[error("upload of '{key}' failed: {message}")]
    UploadFailed {
        /// Object key that was being written.
        key: String,
        /// Underlying error text.
        message: String,
    },
}

/// Infer the content type for an object key from its extension.
#[must_use]
pub fn content_type_for(key: &str) -> &'static str {
    let lower = key.to_ascii_lowercase();
    if lower.ends_with(".mp3") {
        "audio/mpeg"
    } else if lower.ends_with(".json") {
        "application/json"
    } else {
        "application/octet-stream"
    }
}

/// Port trait for publishing final artifacts.
///
/// The sink writes objects but never reads them back; the returned URL is
/// composed from a configured CDN base and the key.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Upload a local file under `key` and return its public URL.
    async fn upload(&self, local_path: &Path, key: &str) -> Result<String, SinkError>;
}
