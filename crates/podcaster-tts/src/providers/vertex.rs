//! Vertex-hosted speech generation.
//!
//! Credential-chain authed (OAuth2). Same request shape as the AI Studio
//! provider but served from the project's Vertex endpoint, with materially
//! higher rate limits and no daily batch quota.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use podcaster_core::{
    AudioFormat, AudioResult, BatchSynthesizer, ProviderKind, ProviderLimits, Script,
    SpeechError, SpeechProvider, Voice, VoiceInfo, VoiceMap,
};

use crate::auth::GcpTokenSource;

use super::util::{decode_inline_audio, dialogue_transcript, network_error, status_error};

const MODEL: &str = "gemini-2.5-flash-preview-tts";
const DEFAULT_LOCATION: &str = "us-central1";

/// Vertex speech provider.
pub struct VertexProvider {
    client: reqwest::Client,
    tokens: Arc<GcpTokenSource>,
    project: String,
    location: String,
}

impl VertexProvider {
    /// Construct over a shared credential chain.
    ///
    /// The project is read from `GOOGLE_CLOUD_PROJECT`; the location from
    /// `GOOGLE_CLOUD_LOCATION` (default `us-central1`).
    pub fn new(tokens: Arc<GcpTokenSource>) -> Result<Self, SpeechError> {
        let project = std::env::var("GOOGLE_CLOUD_PROJECT").map_err(|_| SpeechError::Auth {
            provider: ProviderKind::Vertex,
            message: "GOOGLE_CLOUD_PROJECT is not set".to_string(),
        })?;
        let location =
            std::env::var("GOOGLE_CLOUD_LOCATION").unwrap_or_else(|_| DEFAULT_LOCATION.to_string());
        Ok(Self {
            client: reqwest::Client::new(),
            tokens,
            project,
            location,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "https://{loc}-aiplatform.googleapis.com/v1/projects/{proj}/locations/{loc}/publishers/google/models/{MODEL}:generateContent",
            loc = self.location,
            proj = self.project,
        )
    }

    async fn generate(&self, body: Value) -> Result<AudioResult, SpeechError> {
        let token = self.tokens.token().await.map_err(|e| SpeechError::Auth {
            provider: ProviderKind::Vertex,
            message: e.to_string(),
        })?;

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| network_error(ProviderKind::Vertex, &e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(ProviderKind::Vertex, status, &text));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| network_error(ProviderKind::Vertex, &e))?;

        let encoded = payload
            .pointer("/candidates/0/content/parts/0/inlineData/data")
            .and_then(Value::as_str)
            .ok_or_else(|| SpeechError::BadPayload {
                provider: ProviderKind::Vertex,
                message: "response carries no inline audio".to_string(),
            })?;

        let data = decode_inline_audio(ProviderKind::Vertex, encoded)?;
        Ok(AudioResult::new(data, AudioFormat::Pcm24k))
    }
}

fn voice_config(voice_id: &str) -> Value {
    json!({ "prebuiltVoiceConfig": { "voiceName": voice_id } })
}

#[async_trait]
impl SpeechProvider for VertexProvider {
    fn name(&self) -> ProviderKind {
        ProviderKind::Vertex
    }

    fn default_voices(&self) -> VoiceMap {
        VoiceMap::new(vec![
            Voice::new("Kore", "Kore", ProviderKind::Vertex),
            Voice::new("Puck", "Puck", ProviderKind::Vertex),
            Voice::new("Charon", "Charon", ProviderKind::Vertex),
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
impl BatchSynthesizer for VertexProvider {
    async fn synthesize_batch(
        &self,
        script: &Script,
        voices: &VoiceMap,
    ) -> Result<AudioResult, SpeechError> {
        let mut speakers: Vec<&str> = Vec::new();
        for segment in &script.segments {
            if !speakers.contains(&segment.speaker.as_str()) {
                speakers.push(&segment.speaker);
            }
        }

        let mut speaker_configs = Vec::new();
        for (i, speaker) in speakers.iter().enumerate() {
            let voice = voices.slot(i).ok_or_else(|| SpeechError::UnknownVoice {
                provider: ProviderKind::Vertex,
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
    ]
}
