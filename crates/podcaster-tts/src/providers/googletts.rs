//! Google Cloud Text-to-Speech.
//!
//! Credential-chain authed, returns MP3 directly, per-segment only.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use podcaster_core::{
    AudioFormat, AudioResult, ProviderKind, ProviderLimits, SpeechError, SpeechProvider, Voice,
    VoiceInfo, VoiceMap,
};

use crate::auth::GcpTokenSource;

use super::util::{decode_inline_audio, network_error, status_error};

const SYNTHESIZE_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Cloud TTS provider.
pub struct GoogleTtsProvider {
    client: reqwest::Client,
    tokens: Arc<GcpTokenSource>,
}

impl GoogleTtsProvider {
    /// Construct over a shared credential chain.
    #[must_use]
    pub fn new(tokens: Arc<GcpTokenSource>) -> Self {
        Self {
            client: reqwest::Client::new(),
            tokens,
        }
    }
}

#[async_trait]
impl SpeechProvider for GoogleTtsProvider {
    fn name(&self) -> ProviderKind {
        ProviderKind::Googletts
    }

    fn default_voices(&self) -> VoiceMap {
        VoiceMap::new(vec![
            Voice::new("en-US-Neural2-F", "Neural2 F", ProviderKind::Googletts),
            Voice::new("en-US-Neural2-D", "Neural2 D", ProviderKind::Googletts),
            Voice::new("en-US-Neural2-C", "Neural2 C", ProviderKind::Googletts),
        ])
        .expect("static voice map is valid")
    }

    fn voice_catalog(&self) -> Vec<VoiceInfo> {
        catalog()
    }

    fn limits(&self) -> ProviderLimits {
        ProviderLimits {
            rpm: 100,
            batch_rpd: None,
        }
    }

    async fn synthesize(&self, text: &str, voice: &Voice) -> Result<AudioResult, SpeechError> {
        let token = self
            .tokens
            .token()
            .await
            .map_err(|e| SpeechError::Auth {
                provider: ProviderKind::Googletts,
                message: e.to_string(),
            })?;

        // The voice name embeds its language code prefix (e.g. en-US-...).
        let language_code: String = voice
            .id
            .splitn(3, '-')
            .take(2)
            .collect::<Vec<_>>()
            .join("-");

        let body = json!({
            "input": { "text": text },
            "voice": { "languageCode": language_code, "name": voice.id },
            "audioConfig": { "audioEncoding": "MP3" },
        });

        let response = self
            .client
            .post(SYNTHESIZE_URL)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| network_error(ProviderKind::Googletts, &e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(ProviderKind::Googletts, status, &text));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| network_error(ProviderKind::Googletts, &e))?;

        let encoded = payload
            .get("audioContent")
            .and_then(Value::as_str)
            .ok_or_else(|| SpeechError::BadPayload {
                provider: ProviderKind::Googletts,
                message: "response carries no audioContent".to_string(),
            })?;

        let data = decode_inline_audio(ProviderKind::Googletts, encoded)?;
        Ok(AudioResult::new(data, AudioFormat::Mp3))
    }
}

/// Selectable voices, available without constructing the provider.
pub(crate) fn catalog() -> Vec<VoiceInfo> {
    vec![
        VoiceInfo {
            id: "en-US-Neural2-F".into(),
            name: "Neural2 F".into(),
            gender: "female".into(),
            description: "Clear US-English newsreader".into(),
            default_for: Some(1),
        },
        VoiceInfo {
            id: "en-US-Neural2-D".into(),
            name: "Neural2 D".into(),
            gender: "male".into(),
            description: "Even, authoritative".into(),
            default_for: Some(2),
        },
        VoiceInfo {
            id: "en-US-Neural2-C".into(),
            name: "Neural2 C".into(),
            gender: "female".into(),
            description: "Conversational".into(),
            default_for: Some(3),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_segment_only_with_high_rpm() {
        let provider = GoogleTtsProvider::new(Arc::new(GcpTokenSource::new()));
        assert!(provider.as_batch().is_none());
        assert_eq!(provider.limits().rpm, 100);
    }
}
