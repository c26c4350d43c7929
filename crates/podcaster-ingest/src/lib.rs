//! Source ingestion: URL, PDF or local text file → [`Content`].
//!
//! Stage 1 of the pipeline. The source type is detected by inspection
//! (scheme prefix, `.pdf` suffix, otherwise a text file); bodies are read
//! through a 25 MiB cap and articles go through boilerplate removal.

mod error;
mod extract;
mod fetch;
mod source;

use std::path::Path;

use tracing::{debug, info};
use url::Url;

use podcaster_core::{derive_title, Content, MAX_CONTENT_BYTES};

pub use error::IngestError;
pub use source::SourceKind;

/// Stage-1 ingester. Cheap to construct; holds one HTTP client.
pub struct Ingester {
    client: reqwest::Client,
}

impl Default for Ingester {
    fn default() -> Self {
        Self::new()
    }
}

impl Ingester {
    /// Create an ingester with the 30 s capped HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: fetch::build_client(),
        }
    }

    /// Ingest any supported source into [`Content`].
    pub async fn ingest(&self, source: &str) -> Result<Content, IngestError> {
        let kind = SourceKind::detect(source);
        debug!(source, ?kind, "ingesting source");

        let content = match kind {
            SourceKind::Url => self.ingest_url(source).await?,
            SourceKind::Pdf => ingest_pdf(source).await?,
            SourceKind::TextFile => ingest_text_file(source).await?,
        };

        if content.text.trim().is_empty() {
            return Err(IngestError::ExtractEmpty(source.to_string()));
        }

        info!(
            source,
            words = content.word_count,
            title = %content.title,
            "ingested content"
        );
        Ok(content)
    }

    async fn ingest_url(&self, raw_url: &str) -> Result<Content, IngestError> {
        let url =
            Url::parse(raw_url).map_err(|_| IngestError::InvalidSource(raw_url.to_string()))?;

        let html = fetch::fetch_capped(&self.client, raw_url).await?;
        let article = extract::extract_article(&html, &url);
        if article.text.is_empty() {
            return Err(IngestError::ExtractEmpty(raw_url.to_string()));
        }

        let title = article
            .title
            .unwrap_or_else(|| derive_title(&article.text));
        Ok(Content::new(article.text, title, raw_url))
    }
}

/// Ingest inline text supplied directly by the caller (no fetch step).
pub fn ingest_inline(text: &str, label: &str) -> Result<Content, IngestError> {
    if text.len() as u64 > MAX_CONTENT_BYTES {
        return Err(IngestError::TooLarge {
            source_ref: label.to_string(),
            limit: MAX_CONTENT_BYTES,
        });
    }
    if text.trim().is_empty() {
        return Err(IngestError::ExtractEmpty(label.to_string()));
    }
    Ok(Content::new(text, derive_title(text), label))
}

async fn ingest_pdf(path: &str) -> Result<Content, IngestError> {
    check_file_size(path).await?;

    // pdf-extract is synchronous and CPU-bound; keep it off the async runtime.
    let owned = path.to_string();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
        .await
        .map_err(|e| IngestError::ReadFailed {
            path: path.to_string(),
            message: e.to_string(),
        })?
        .map_err(|e| IngestError::ReadFailed {
            path: path.to_string(),
            message: e.to_string(),
        })?;

    if text.trim().is_empty() {
        return Err(IngestError::ExtractEmpty(path.to_string()));
    }
    let title = derive_title(&text);
    Ok(Content::new(text, title, path))
}

async fn ingest_text_file(path: &str) -> Result<Content, IngestError> {
    check_file_size(path).await?;

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| IngestError::ReadFailed {
            path: path.to_string(),
            message: e.to_string(),
        })?;

    if text.trim().is_empty() {
        return Err(IngestError::ExtractEmpty(path.to_string()));
    }
    let title = derive_title(&text);
    Ok(Content::new(text, title, path))
}

async fn check_file_size(path: &str) -> Result<(), IngestError> {
    let meta = tokio::fs::metadata(Path::new(path))
        .await
        .map_err(|e| IngestError::ReadFailed {
            path: path.to_string(),
            message: e.to_string(),
        })?;

    if meta.len() > MAX_CONTENT_BYTES {
        return Err(IngestError::TooLarge {
            source_ref: path.to_string(),
            limit: MAX_CONTENT_BYTES,
        });
    }
    Ok(())
}
