//! Language-model port used by the script generator.

use async_trait::async_trait;
use thiserror::Error;

/// One completion request: system + user prompt and decoding caps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatRequest {
    /// Model identifier (backend-specific).
    pub model: String,
    /// System prompt (persona roster + output contract).
    pub system: String,
    /// User prompt (content + directives).
    pub user: String,
    /// Output-token cap from the duration preset.
    pub max_tokens: u32,
    /// Per-request API-key override; falls back to the client's configured key.
    pub api_key_override: Option<String>,
}

/// Errors from the language-model backend.
#[derive(Debug, Error)]
pub enum ScriptModelError {
    /// Transport-level failure (DNS, TLS, timeout). Retried by the generator.
    #[error("model transport error: {0}")]
    Transport(String),

    /// The API returned a non-success status.
    #[error("model API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response excerpt.
        message: String,
    },

    /// The API succeeded but returned no usable text. Retried.
    #[error("model returned an empty response")]
    Empty,
}

impl ScriptModelError {
    /// Whether the generator's retry loop may re-attempt this error.
    ///
    /// Transport errors and empty responses are retried; API 4xx aborts
    /// (a bad request will not get better), API 5xx and 429 are retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Empty => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// Port trait for the chat-completion backend.
#[async_trait]
pub trait ScriptModel: Send + Sync {
    /// Run one completion and return the raw response text.
    async fn complete(&self, request: &ChatRequest) -> Result<String, ScriptModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(ScriptModelError::Transport("t".into()).is_retryable());
        assert!(ScriptModelError::Empty.is_retryable());
        assert!(ScriptModelError::Api {
            status: 429,
            message: String::new()
        }
        .is_retryable());
        assert!(ScriptModelError::Api {
            status: 500,
            message: String::new()
        }
        .is_retryable());
        assert!(!ScriptModelError::Api {
            status: 401,
            message: String::new()
        }
        .is_retryable());
    }
}
