//! Capped HTTP fetching.

use std::time::Duration;

use podcaster_core::MAX_CONTENT_BYTES;

use crate::error::IngestError;

/// Non-default user agent; some servers block HTTP-library defaults.
const USER_AGENT: &str = "podcaster/0.3 (+https://github.com/apresai/podcaster-rs)";

/// Request timeout for source fetches.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the ingestion HTTP client.
pub(crate) fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .expect("failed to create HTTP client")
}

/// GET a URL and read the body through the 25 MiB cap.
pub(crate) async fn fetch_capped(
    client: &reqwest::Client,
    url: &str,
) -> Result<String, IngestError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| IngestError::FetchFailed {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(IngestError::FetchFailed {
            url: url.to_string(),
            message: format!("HTTP {status}"),
        });
    }

    let mut body: Vec<u8> = Vec::new();
    let mut response = response;
    while let Some(chunk) = response.chunk().await.map_err(|e| IngestError::FetchFailed {
        url: url.to_string(),
        message: e.to_string(),
    })? {
        if body.len() as u64 + chunk.len() as u64 > MAX_CONTENT_BYTES {
            return Err(IngestError::TooLarge {
                source_ref: url.to_string(),
                limit: MAX_CONTENT_BYTES,
            });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}
