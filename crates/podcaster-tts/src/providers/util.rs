//! Shared helpers for the HTTP providers.

use base64::Engine as _;
use reqwest::StatusCode;

use podcaster_core::{ProviderKind, Script, SpeechError};

/// Map a non-success HTTP status onto the speech error taxonomy.
pub(crate) fn status_error(provider: ProviderKind, status: StatusCode, body: &str) -> SpeechError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return SpeechError::RateLimited { provider };
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return SpeechError::Auth {
            provider,
            message: format!("HTTP {status}"),
        };
    }
    let excerpt: String = body.chars().take(300).collect();
    SpeechError::Upstream {
        provider,
        status: status.as_u16(),
        message: excerpt,
    }
}

/// Map a transport failure.
pub(crate) fn network_error(provider: ProviderKind, error: &reqwest::Error) -> SpeechError {
    SpeechError::Network {
        provider,
        message: error.to_string(),
    }
}

/// Decode inline base64 audio, rejecting empty payloads.
pub(crate) fn decode_inline_audio(
    provider: ProviderKind,
    encoded: &str,
) -> Result<Vec<u8>, SpeechError> {
    let data = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| SpeechError::BadPayload {
            provider,
            message: format!("base64 decode failed: {e}"),
        })?;
    if data.is_empty() {
        return Err(SpeechError::BadPayload {
            provider,
            message: "empty audio payload".to_string(),
        });
    }
    Ok(data)
}

/// Flatten a script into `Speaker: text` lines for batch endpoints that take
/// one annotated transcript.
pub(crate) fn dialogue_transcript(script: &Script) -> String {
    script
        .segments
        .iter()
        .map(|s| format!("{}: {}", s.speaker, s.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Resolve an API key: explicit configuration wins, then the environment.
pub(crate) fn resolve_api_key(
    configured: Option<&str>,
    env_var: &str,
    provider: ProviderKind,
) -> Result<String, SpeechError> {
    if let Some(key) = configured {
        if !key.trim().is_empty() {
            return Ok(key.to_string());
        }
    }
    match std::env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(SpeechError::Auth {
            provider,
            message: format!("no API key configured (set {env_var})"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podcaster_core::Segment;

    #[test]
    fn status_429_is_rate_limited() {
        let err = status_error(ProviderKind::Gemini, StatusCode::TOO_MANY_REQUESTS, "");
        assert!(matches!(err, SpeechError::RateLimited { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn status_401_is_auth() {
        let err = status_error(ProviderKind::Openai, StatusCode::UNAUTHORIZED, "nope");
        assert!(matches!(err, SpeechError::Auth { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn status_503_is_retryable_upstream() {
        let err = status_error(ProviderKind::Vertex, StatusCode::SERVICE_UNAVAILABLE, "busy");
        assert!(err.is_retryable());
    }

    #[test]
    fn inline_audio_decodes() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"pcmdata");
        let data = decode_inline_audio(ProviderKind::Gemini, &encoded).unwrap();
        assert_eq!(data, b"pcmdata");
    }

    #[test]
    fn empty_inline_audio_is_rejected() {
        assert!(decode_inline_audio(ProviderKind::Gemini, "").is_err());
        assert!(decode_inline_audio(ProviderKind::Gemini, "!!!").is_err());
    }

    #[test]
    fn transcript_is_speaker_annotated() {
        let script = Script {
            title: "T".into(),
            summary: "S".into(),
            segments: vec![
                Segment::new("Maya", "Hello."),
                Segment::new("Theo", "Hi there."),
            ],
        };
        assert_eq!(dialogue_transcript(&script), "Maya: Hello.\nTheo: Hi there.");
    }
}
