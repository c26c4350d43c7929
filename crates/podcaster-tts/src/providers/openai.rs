//! OpenAI speech endpoint.
//!
//! API-key authed, returns MP3 directly, per-segment only.

use async_trait::async_trait;
use serde_json::json;

use podcaster_core::{
    AudioFormat, AudioResult, ProviderKind, ProviderLimits, SpeechError, SpeechProvider, Voice,
    VoiceInfo, VoiceMap,
};

use super::util::{network_error, resolve_api_key, status_error};

const BASE_URL: &str = "https://api.openai.com/v1";
const MODEL: &str = "tts-1";

/// OpenAI speech provider.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
}

impl OpenAiProvider {
    /// Construct with an optional configured key (falls back to `OPENAI_API_KEY`).
    pub fn new(configured_key: Option<&str>) -> Result<Self, SpeechError> {
        let api_key = resolve_api_key(configured_key, "OPENAI_API_KEY", ProviderKind::Openai)?;
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
        })
    }
}

#[async_trait]
impl SpeechProvider for OpenAiProvider {
    fn name(&self) -> ProviderKind {
        ProviderKind::Openai
    }

    fn default_voices(&self) -> VoiceMap {
        VoiceMap::new(vec![
            Voice::new("nova", "Nova", ProviderKind::Openai),
            Voice::new("onyx", "Onyx", ProviderKind::Openai),
            Voice::new("alloy", "Alloy", ProviderKind::Openai),
        ])
        .expect("static voice map is valid")
    }

    fn voice_catalog(&self) -> Vec<VoiceInfo> {
        catalog()
    }

    fn limits(&self) -> ProviderLimits {
        ProviderLimits {
            rpm: 50,
            batch_rpd: None,
        }
    }

    async fn synthesize(&self, text: &str, voice: &Voice) -> Result<AudioResult, SpeechError> {
        let url = format!("{BASE_URL}/audio/speech");
        let body = json!({
            "model": MODEL,
            "voice": voice.id,
            "input": text,
            "response_format": "mp3",
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| network_error(ProviderKind::Openai, &e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(ProviderKind::Openai, status, &text));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| network_error(ProviderKind::Openai, &e))?
            .to_vec();
        if data.is_empty() {
            return Err(SpeechError::BadPayload {
                provider: ProviderKind::Openai,
                message: "empty audio body".to_string(),
            });
        }
        Ok(AudioResult::new(data, AudioFormat::Mp3))
    }
}

/// Selectable voices, available without constructing the provider.
pub(crate) fn catalog() -> Vec<VoiceInfo> {
    vec![
        VoiceInfo {
            id: "nova".into(),
            name: "Nova".into(),
            gender: "female".into(),
            description: "Bright and energetic".into(),
            default_for: Some(1),
        },
        VoiceInfo {
            id: "onyx".into(),
            name: "Onyx".into(),
            gender: "male".into(),
            description: "Low and resonant".into(),
            default_for: Some(2),
        },
        VoiceInfo {
            id: "alloy".into(),
            name: "Alloy".into(),
            gender: "neutral".into(),
            description: "Balanced all-rounder".into(),
            default_for: Some(3),
        },
        VoiceInfo {
            id: "shimmer".into(),
            name: "Shimmer".into(),
            gender: "female".into(),
            description: "Light and airy".into(),
            default_for: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_segment_only() {
        let provider = OpenAiProvider::new(Some("key")).unwrap();
        assert!(provider.as_batch().is_none());
        assert_eq!(provider.limits().rpm, 50);
    }
}
