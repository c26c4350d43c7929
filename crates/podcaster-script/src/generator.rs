//! The retrying script generator.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use podcaster_core::{roster_names, ChatRequest, Content, EpisodeSpec, Script, ScriptModel, ScriptModelError};

use crate::parse::{parse_script, ParseError};
use crate::prompt::{system_prompt, user_prompt};

/// Maximum model attempts per generation.
const MAX_ATTEMPTS: u32 = 3;

/// Delay before the second attempt; doubles per attempt.
const BASE_DELAY: Duration = Duration::from_secs(1);

/// Errors from the generator after its retry policy is exhausted.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The model backend failed unrecoverably or on the last attempt.
    #[error("script generation failed after {attempts} attempts: {last}")]
    Exhausted {
        /// How many attempts were made.
        attempts: u32,
        /// Description of the final failure.
        last: String,
    },

    /// A non-retryable API failure (e.g. bad credentials).
    #[error("script generation failed: {0}")]
    Fatal(#[from] ScriptModelError),

    /// Cancellation observed between attempts.
    #[error("script generation canceled")]
    Canceled,
}

/// Stage-2 generator: prompts the model and parses the dialogue script.
pub struct ScriptGenerator {
    model: Arc<dyn ScriptModel>,
}

impl ScriptGenerator {
    /// Create a generator over a model backend.
    pub fn new(model: Arc<dyn ScriptModel>) -> Self {
        Self { model }
    }

    /// Generate and validate a script for the given content.
    ///
    /// Retries up to 3 times on transport errors, empty responses and JSON
    /// parse failures; delays 1 s then 2 s between attempts. Non-retryable
    /// API errors abort immediately.
    pub async fn generate(
        &self,
        content: &Content,
        spec: &EpisodeSpec,
        api_key_override: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Script, GenerateError> {
        let voice_count = spec.voice_count();
        let names = roster_names(voice_count);
        let request = ChatRequest {
            model: spec.model.clone(),
            system: system_prompt(voice_count),
            user: user_prompt(content, spec),
            max_tokens: spec.duration.max_output_tokens(),
            api_key_override: api_key_override.map(str::to_string),
        };

        let mut last_failure = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            if cancel.is_cancelled() {
                return Err(GenerateError::Canceled);
            }
            if attempt > 1 {
                let delay = BASE_DELAY * 2u32.pow(attempt - 2);
                tokio::select! {
                    () = cancel.cancelled() => return Err(GenerateError::Canceled),
                    () = tokio::time::sleep(delay) => {}
                }
            }

            match self.model.complete(&request).await {
                Ok(raw) => match parse_script(&raw, &names) {
                    Ok(script) => {
                        info!(
                            attempt,
                            segments = script.segments.len(),
                            words = script.word_count(),
                            est_minutes = script.estimated_minutes(),
                            "script generated"
                        );
                        return Ok(script);
                    }
                    Err(e @ (ParseError::NoJson | ParseError::Malformed(_))) => {
                        warn!(attempt, error = %e, "unparsable model response, retrying");
                        last_failure = e.to_string();
                    }
                    Err(e @ ParseError::Invalid(_)) => {
                        // Structural violations rarely self-correct, but the
                        // model is sampled fresh each attempt, so retry too.
                        warn!(attempt, error = %e, "invalid script, retrying");
                        last_failure = e.to_string();
                    }
                },
                Err(e) if e.is_retryable() => {
                    warn!(attempt, error = %e, "model call failed, retrying");
                    last_failure = e.to_string();
                }
                Err(e) => return Err(GenerateError::Fatal(e)),
            }
        }

        Err(GenerateError::Exhausted {
            attempts: MAX_ATTEMPTS,
            last: last_failure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use podcaster_core::{DurationPreset, EpisodeFormat, ProviderKind, Tone};

    /// Scripted fake backend returning canned responses in order.
    struct FakeModel {
        responses: Mutex<Vec<Result<String, ScriptModelError>>>,
        calls: Mutex<u32>,
    }

    impl FakeModel {
        fn new(responses: Vec<Result<String, ScriptModelError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ScriptModel for FakeModel {
        async fn complete(&self, _request: &ChatRequest) -> Result<String, ScriptModelError> {
            *self.calls.lock().unwrap() += 1;
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Err(ScriptModelError::Empty)
            } else {
                responses.remove(0)
            }
        }
    }

    fn spec() -> EpisodeSpec {
        EpisodeSpec {
            source: None,
            input_text: Some("t".into()),
            from_script: None,
            script_only: false,
            topic: None,
            tone: Tone::Casual,
            duration: DurationPreset::Short,
            styles: vec![],
            format: EpisodeFormat::Conversation,
            voices: 2,
            model: "test-model".into(),
            tts: ProviderKind::Gemini,
            voice_overrides: [None, None, None],
            disable_batch: false,
            llm_api_key: None,
        }
    }

    fn content() -> Content {
        Content::new("words", "Title", "inline")
    }

    const GOOD: &str = r#"{"title":"T","summary":"S","segments":[{"speaker":"Maya","text":"Hi."}]}"#;

    #[tokio::test(start_paused = true)]
    async fn succeeds_first_try() {
        let model = Arc::new(FakeModel::new(vec![Ok(GOOD.to_string())]));
        let generator = ScriptGenerator::new(model.clone());
        let script = generator
            .generate(&content(), &spec(), None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(script.segments.len(), 1);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_prose_then_succeeds() {
        let model = Arc::new(FakeModel::new(vec![
            Ok("no json here".to_string()),
            Ok(GOOD.to_string()),
        ]));
        let generator = ScriptGenerator::new(model.clone());
        let script = generator
            .generate(&content(), &spec(), None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(script.title, "T");
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_three_attempts() {
        let model = Arc::new(FakeModel::new(vec![
            Ok("prose".to_string()),
            Ok("still prose".to_string()),
            Ok("prose again".to_string()),
        ]));
        let generator = ScriptGenerator::new(model.clone());
        let err = generator
            .generate(&content(), &spec(), None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Exhausted { attempts: 3, .. }));
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_api_error_aborts_immediately() {
        let model = Arc::new(FakeModel::new(vec![Err(ScriptModelError::Api {
            status: 401,
            message: "bad key".into(),
        })]));
        let generator = ScriptGenerator::new(model.clone());
        let err = generator
            .generate(&content(), &spec(), None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Fatal(_)));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_retries() {
        let model = Arc::new(FakeModel::new(vec![Ok("prose".to_string())]));
        let generator = ScriptGenerator::new(model);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = generator
            .generate(&content(), &spec(), None, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Canceled));
    }
}
