//! Artifact sink implementations.
//!
//! `LocalDirSink` copies the episode into a served directory and composes
//! the public URL from a CDN base. `HttpPutSink` PUTs the bytes to an
//! object-store endpoint. Both retry a failed upload exactly once.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, warn};

use podcaster_core::{content_type_for, ArtifactSink, SinkError};

/// Compose `<base>/<key>` without doubling slashes.
fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}

/// Sink that copies artifacts into a locally served directory.
pub struct LocalDirSink {
    public_dir: PathBuf,
    cdn_base: String,
}

impl LocalDirSink {
    /// Create a sink writing under `public_dir`, publishing URLs under `cdn_base`.
    pub fn new(public_dir: impl Into<PathBuf>, cdn_base: impl Into<String>) -> Self {
        Self {
            public_dir: public_dir.into(),
            cdn_base: cdn_base.into(),
        }
    }

    async fn copy_once(&self, local_path: &Path, key: &str) -> Result<(), SinkError> {
        let dest = self.public_dir.join(key);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SinkError::UploadFailed {
                    key: key.to_string(),
                    message: e.to_string(),
                })?;
        }
        tokio::fs::copy(local_path, &dest)
            .await
            .map_err(|e| SinkError::UploadFailed {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}

#[async_trait]
impl ArtifactSink for LocalDirSink {
    async fn upload(&self, local_path: &Path, key: &str) -> Result<String, SinkError> {
        if let Err(first) = self.copy_once(local_path, key).await {
            warn!(key, error = %first, "artifact copy failed, retrying once");
            self.copy_once(local_path, key).await?;
        }

        let url = join_url(&self.cdn_base, key);
        info!(key, url = %url, "published artifact");
        Ok(url)
    }
}

/// Sink that PUTs artifacts to an object-store endpoint.
pub struct HttpPutSink {
    client: reqwest::Client,
    put_base: String,
    cdn_base: String,
}

impl HttpPutSink {
    /// Create a sink PUTting under `put_base`, publishing URLs under `cdn_base`.
    pub fn new(put_base: impl Into<String>, cdn_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            put_base: put_base.into(),
            cdn_base: cdn_base.into(),
        }
    }

    async fn put_once(&self, local_path: &Path, key: &str) -> Result<(), SinkError> {
        let bytes = tokio::fs::read(local_path)
            .await
            .map_err(|e| SinkError::ReadFailed {
                path: local_path.display().to_string(),
                message: e.to_string(),
            })?;

        let url = join_url(&self.put_base, key);
        let response = self
            .client
            .put(&url)
            .header("Content-Type", content_type_for(key))
            .body(bytes)
            .send()
            .await
            .map_err(|e| SinkError::UploadFailed {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::UploadFailed {
                key: key.to_string(),
                message: format!("HTTP {status}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ArtifactSink for HttpPutSink {
    async fn upload(&self, local_path: &Path, key: &str) -> Result<String, SinkError> {
        if let Err(first) = self.put_once(local_path, key).await {
            // Read failures will not improve on retry; surface them directly.
            if matches!(first, SinkError::ReadFailed { .. }) {
                return Err(first);
            }
            warn!(key, error = %first, "upload failed, retrying once");
            self.put_once(local_path, key).await?;
        }

        Ok(join_url(&self.cdn_base, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joining_handles_slashes() {
        assert_eq!(
            join_url("https://cdn.example.com/", "/episodes/ep.mp3"),
            "https://cdn.example.com/episodes/ep.mp3"
        );
        assert_eq!(
            join_url("https://cdn.example.com", "episodes/ep.mp3"),
            "https://cdn.example.com/episodes/ep.mp3"
        );
    }

    #[tokio::test]
    async fn local_sink_copies_and_composes_url() {
        let src_dir = tempfile::tempdir().unwrap();
        let pub_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("ep.mp3");
        tokio::fs::write(&src, b"audio").await.unwrap();

        let sink = LocalDirSink::new(pub_dir.path(), "https://cdn.example.com");
        let url = sink.upload(&src, "episodes/ep.mp3").await.unwrap();

        assert_eq!(url, "https://cdn.example.com/episodes/ep.mp3");
        let copied = tokio::fs::read(pub_dir.path().join("episodes/ep.mp3"))
            .await
            .unwrap();
        assert_eq!(copied, b"audio");
    }

    #[tokio::test]
    async fn local_sink_fails_for_missing_source() {
        let pub_dir = tempfile::tempdir().unwrap();
        let sink = LocalDirSink::new(pub_dir.path(), "https://cdn.example.com");
        let err = sink
            .upload(Path::new("/no/such/ep.mp3"), "episodes/ep.mp3")
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::UploadFailed { .. }));
    }
}
