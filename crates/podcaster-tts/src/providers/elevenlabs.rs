//! ElevenLabs synthesis.
//!
//! API-key authed. Per-segment synthesis via the text-to-speech endpoint
//! and batch multi-speaker synthesis via the dialogue endpoint, both
//! requested as raw PCM (s16le, 24 kHz, mono).

use async_trait::async_trait;
use serde_json::json;

use podcaster_core::{
    AudioFormat, AudioResult, BatchSynthesizer, ProviderKind, ProviderLimits, Script,
    SpeechError, SpeechProvider, Voice, VoiceInfo, VoiceMap,
};

use super::util::{network_error, resolve_api_key, status_error};

const BASE_URL: &str = "https://api.elevenlabs.io/v1";
const MODEL_ID: &str = "eleven_multilingual_v2";
const OUTPUT_FORMAT: &str = "pcm_24000";

/// ElevenLabs speech provider.
pub struct ElevenLabsProvider {
    client: reqwest::Client,
    api_key: String,
}

impl ElevenLabsProvider {
    /// Construct with an optional configured key (falls back to `ELEVENLABS_API_KEY`).
    pub fn new(configured_key: Option<&str>) -> Result<Self, SpeechError> {
        let api_key = resolve_api_key(
            configured_key,
            "ELEVENLABS_API_KEY",
            ProviderKind::Elevenlabs,
        )?;
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
        })
    }

    async fn post_audio(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<AudioResult, SpeechError> {
        let response = self
            .client
            .post(url)
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| network_error(ProviderKind::Elevenlabs, &e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(ProviderKind::Elevenlabs, status, &text));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| network_error(ProviderKind::Elevenlabs, &e))?
            .to_vec();
        if data.is_empty() {
            return Err(SpeechError::BadPayload {
                provider: ProviderKind::Elevenlabs,
                message: "empty audio body".to_string(),
            });
        }
        Ok(AudioResult::new(data, AudioFormat::Pcm24k))
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsProvider {
    fn name(&self) -> ProviderKind {
        ProviderKind::Elevenlabs
    }

    fn default_voices(&self) -> VoiceMap {
        VoiceMap::new(vec![
            Voice::new("21m00Tcm4TlvDq8ikWAM", "Rachel", ProviderKind::Elevenlabs),
            Voice::new("pNInz6obpgDQGcFmaJgB", "Adam", ProviderKind::Elevenlabs),
            Voice::new("EXAVITQu4vr4xnSDxMaL", "Bella", ProviderKind::Elevenlabs),
        ])
        .expect("static voice map is valid")
    }

    fn voice_catalog(&self) -> Vec<VoiceInfo> {
        catalog()
    }

    fn limits(&self) -> ProviderLimits {
        ProviderLimits {
            rpm: 60,
            batch_rpd: None,
        }
    }

    async fn synthesize(&self, text: &str, voice: &Voice) -> Result<AudioResult, SpeechError> {
        let url = format!(
            "{BASE_URL}/text-to-speech/{}?output_format={OUTPUT_FORMAT}",
            voice.id
        );
        let body = json!({ "text": text, "model_id": MODEL_ID });
        self.post_audio(&url, body).await
    }

    fn as_batch(&self) -> Option<&dyn BatchSynthesizer> {
        Some(self)
    }
}

#[async_trait]
impl BatchSynthesizer for ElevenLabsProvider {
    async fn synthesize_batch(
        &self,
        script: &Script,
        voices: &VoiceMap,
    ) -> Result<AudioResult, SpeechError> {
        // The dialogue endpoint takes per-line voice ids; map each segment's
        // speaker to its slot voice by first-appearance order.
        let mut speakers: Vec<&str> = Vec::new();
        for segment in &script.segments {
            if !speakers.contains(&segment.speaker.as_str()) {
                speakers.push(&segment.speaker);
            }
        }

        let mut inputs = Vec::with_capacity(script.segments.len());
        for segment in &script.segments {
            let slot = speakers
                .iter()
                .position(|s| *s == segment.speaker)
                .unwrap_or(0);
            let voice = voices.slot(slot).ok_or_else(|| SpeechError::UnknownVoice {
                provider: ProviderKind::Elevenlabs,
                voice: segment.speaker.clone(),
            })?;
            inputs.push(json!({ "text": segment.text, "voice_id": voice.id }));
        }

        let url = format!("{BASE_URL}/text-to-dialogue?output_format={OUTPUT_FORMAT}");
        let body = json!({ "inputs": inputs, "model_id": "eleven_v3" });
        self.post_audio(&url, body).await
    }
}

/// Selectable voices, available without constructing the provider.
pub(crate) fn catalog() -> Vec<VoiceInfo> {
    vec![
        VoiceInfo {
            id: "21m00Tcm4TlvDq8ikWAM".into(),
            name: "Rachel".into(),
            gender: "female".into(),
            description: "Calm, narration-ready".into(),
            default_for: Some(1),
        },
        VoiceInfo {
            id: "pNInz6obpgDQGcFmaJgB".into(),
            name: "Adam".into(),
            gender: "male".into(),
            description: "Deep, confident".into(),
            default_for: Some(2),
        },
        VoiceInfo {
            id: "EXAVITQu4vr4xnSDxMaL".into(),
            name: "Bella".into(),
            gender: "female".into(),
            description: "Soft, friendly".into(),
            default_for: Some(3),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_capability_and_limits() {
        let provider = ElevenLabsProvider::new(Some("key")).unwrap();
        assert!(provider.as_batch().is_some());
        assert_eq!(provider.limits().rpm, 60);
        assert_eq!(provider.limits().batch_rpd, None);
        assert_eq!(
            provider.limits().min_interval(),
            std::time::Duration::from_secs(1)
        );
    }

    #[test]
    fn default_voices_fill_all_slots() {
        let provider = ElevenLabsProvider::new(Some("key")).unwrap();
        let voices = provider.default_voices();
        assert_eq!(voices.len(), 3);
        assert_eq!(voices.uniform_provider(), Some(ProviderKind::Elevenlabs));
    }
}
