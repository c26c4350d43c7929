//! Google AI Studio speech generation.
//!
//! API-key authed. Supports single-voice and multi-speaker batch synthesis,
//! returning inline base64 PCM (s16le, 24 kHz, mono). The free tier is
//! tightly limited: 10 requests per minute, and the batch endpoint shares a
//! 100 requests-per-day quota across the whole deployment.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use podcaster_core::{
    AudioFormat, AudioResult, BatchSynthesizer, ProviderKind, ProviderLimits, Script,
    SpeechError, SpeechProvider, Voice, VoiceInfo, VoiceMap,
};

use super::util::{
    decode_inline_audio, dialogue_transcript, network_error, resolve_api_key, status_error,
};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL: &str = "gemini-2.5-flash-preview-tts";

/// AI Studio speech provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
}

impl GeminiProvider {
    /// Construct with an optional configured key (falls back to `GEMINI_API_KEY`).
    pub fn new(configured_key: Option<&str>) -> Result<Self, SpeechError> {
        let api_key = resolve_api_key(configured_key, "GEMINI_API_KEY", ProviderKind::Gemini)?;
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
        })
    }

    async fn generate(&self, body: Value) -> Result<AudioResult, SpeechError> {
        let url = format!("{BASE_URL}/models/{MODEL}:generateContent");
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| network_error(ProviderKind::Gemini, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(ProviderKind::Gemini, status, &body));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| network_error(ProviderKind::Gemini, &e))?;

        let encoded = payload
            .pointer("/candidates/0/content/parts/0/inlineData/data")
            .and_then(Value::as_str)
            .ok_or_else(|| SpeechError::BadPayload {
                provider: ProviderKind::Gemini,
                message: "response carries no inline audio".to_string(),
            })?;

        let data = decode_inline_audio(ProviderKind::Gemini, encoded)?;
        debug!(bytes = data.len(), "decoded inline PCM");
        Ok(AudioResult::new(data, AudioFormat::Pcm24k))
    }
}

fn voice_config(voice_id: &str) -> Value {
    json!({ "prebuiltVoiceConfig": { "voiceName": voice_id } })
}

#[async_trait]
impl SpeechProvider for GeminiProvider {
    fn name(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn default_voices(&self) -> VoiceMap {
        VoiceMap::new(vec![
            Voice::new("Kore", "Kore", ProviderKind::Gemini),
            Voice::new("Puck", "Puck", ProviderKind::Gemini),
            Voice::new("Charon", "Charon", ProviderKind::Gemini),
        ])
        .expect("static voice map is valid")
    }

    fn voice_catalog(&self) -> Vec<VoiceInfo> {
        catalog()
    }

    fn limits(&self) -> ProviderLimits {
        ProviderLimits {
            rpm: 10,
            batch_rpd: Some(100),
        }
    }

    async fn synthesize(&self, text: &str, voice: &Voice) -> Result<AudioResult, SpeechError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": { "voiceConfig": voice_config(&voice.id) },
            },
        });
        self.generate(body).await
    }

    fn as_batch(&self) -> Option<&dyn BatchSynthesizer> {
        Some(self)
    }
}

#[async_trait]
impl BatchSynthesizer for GeminiProvider {
    async fn synthesize_batch(
        &self,
        script: &Script,
        voices: &VoiceMap,
    ) -> Result<AudioResult, SpeechError> {
        // One speaker config per distinct speaker, bound slot-by-slot.
        let mut speaker_configs = Vec::new();
        let speakers: Vec<&str> = {
            let mut seen = Vec::new();
            for segment in &script.segments {
                if !seen.contains(&segment.speaker.as_str()) {
                    seen.push(segment.speaker.as_str());
                }
            }
            seen
        };
        for (i, speaker) in speakers.iter().enumerate() {
            let voice = voices.slot(i).ok_or_else(|| SpeechError::UnknownVoice {
                provider: ProviderKind::Gemini,
                voice: (*speaker).to_string(),
            })?;
            speaker_configs.push(json!({
                "speaker": speaker,
                "voiceConfig": voice_config(&voice.id),
            }));
        }

        let body = json!({
            "contents": [{ "parts": [{ "text": dialogue_transcript(script) }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "multiSpeakerVoiceConfig": { "speakerVoiceConfigs": speaker_configs },
                },
            },
        });
        self.generate(body).await
    }
}

/// Selectable voices, available without constructing the provider.
pub(crate) fn catalog() -> Vec<VoiceInfo> {
    vec![
        VoiceInfo {
            id: "Kore".into(),
            name: "Kore".into(),
            gender: "female".into(),
            description: "Firm, engaged narrator".into(),
            default_for: Some(1),
        },
        VoiceInfo {
            id: "Puck".into(),
            name: "Puck".into(),
            gender: "male".into(),
            description: "Upbeat conversationalist".into(),
            default_for: Some(2),
        },
        VoiceInfo {
            id: "Charon".into(),
            name: "Charon".into(),
            gender: "male".into(),
            description: "Informative, deliberate".into(),
            default_for: Some(3),
        },
        VoiceInfo {
            id: "Aoede".into(),
            name: "Aoede".into(),
            gender: "female".into(),
            description: "Breezy and light".into(),
            default_for: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_strict() {
        let provider = GeminiProvider::new(Some("test-key")).unwrap();
        assert_eq!(provider.limits().rpm, 10);
        assert_eq!(provider.limits().batch_rpd, Some(100));
        assert_eq!(
            provider.limits().min_interval(),
            std::time::Duration::from_secs(6)
        );
    }

    #[test]
    fn provider_is_batch_capable() {
        let provider = GeminiProvider::new(Some("key")).unwrap();
        assert!(provider.as_batch().is_some());
        assert_eq!(provider.default_voices().len(), 3);
    }
}
