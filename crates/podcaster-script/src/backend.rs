//! Chat-completions backend over HTTP.
//!
//! Speaks the OpenAI-compatible `/v1/chat/completions` shape, which the
//! supported language-model gateways all accept. The backend is a thin
//! transport: retry policy lives in the generator.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use podcaster_core::{ChatRequest, ScriptModel, ScriptModelError};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Request timeout. Long-form scripts can take minutes to decode.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(600);

/// Production chat backend using reqwest.
pub struct HttpChatBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpChatBackend {
    /// Create a backend against a base URL with an optional default API key.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to create HTTP client");
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl ScriptModel for HttpChatBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ScriptModelError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": request.model,
            "max_tokens": request.max_tokens,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.user},
            ],
        });

        let key = request
            .api_key_override
            .as_deref()
            .or(self.api_key.as_deref());

        let mut http = self.client.post(&url).json(&body);
        if let Some(key) = key {
            http = http.header("Authorization", format!("Bearer {key}"));
        }

        debug!(model = %request.model, max_tokens = request.max_tokens, "requesting completion");

        let response = http
            .send()
            .await
            .map_err(|e| ScriptModelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            let excerpt: String = message.chars().take(300).collect();
            return Err(ScriptModelError::Api {
                status: status.as_u16(),
                message: excerpt,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ScriptModelError::Transport(e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ScriptModelError::Empty);
        }
        Ok(text)
    }
}
