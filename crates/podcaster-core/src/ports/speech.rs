//! Speech synthesis ports.
//!
//! The provider interface is a capability set, not a hierarchy: every
//! provider synthesizes one segment at a time; batch-capable providers
//! additionally expose [`BatchSynthesizer`] through a feature-test method.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ProviderKind, Script, Voice, VoiceInfo, VoiceMap};

/// Audio container/encoding of a synthesis result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// MPEG layer-3, concatenable as-is after parameter unification.
    Mp3,
    /// Raw signed 16-bit little-endian PCM, 24 kHz, mono.
    Pcm24k,
    /// RIFF WAV; parameters auto-detected by the converter.
    Wav,
}

impl AudioFormat {
    /// File extension used for intermediate segment files.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Pcm24k | Self::Wav => "raw",
        }
    }
}

/// One synthesized audio payload.
#[derive(Debug, Clone)]
pub struct AudioResult {
    /// Encoded or raw audio bytes.
    pub data: Vec<u8>,
    /// How to interpret `data`.
    pub format: AudioFormat,
}

impl AudioResult {
    /// Wrap a payload.
    #[must_use]
    pub const fn new(data: Vec<u8>, format: AudioFormat) -> Self {
        Self { data, format }
    }

    /// Whether the payload is empty (an integrity failure upstream).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Declared request-rate limits for a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderLimits {
    /// Requests per minute; `0` means unlimited.
    pub rpm: u32,
    /// Requests per day on the batch endpoint; `None` when unlimited.
    pub batch_rpd: Option<u32>,
}

impl ProviderLimits {
    /// Minimum spacing between sequential calls implied by the RPM limit.
    #[must_use]
    pub fn min_interval(&self) -> std::time::Duration {
        if self.rpm == 0 {
            std::time::Duration::ZERO
        } else {
            std::time::Duration::from_secs_f64(60.0 / f64::from(self.rpm))
        }
    }
}

/// Errors from speech synthesis calls.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// HTTP 429 from the provider. Retryable.
    #[error("{provider} rate limited the request")]
    RateLimited {
        /// Provider tag.
        provider: ProviderKind,
    },

    /// Upstream HTTP error. Retryable when the status is 5xx.
    #[error("{provider} request failed with status {status}: {message}")]
    Upstream {
        /// Provider tag.
        provider: ProviderKind,
        /// HTTP status code.
        status: u16,
        /// Response excerpt or status text.
        message: String,
    },

    /// Authentication or credential-chain failure. Not retryable.
    #[error("{provider} authentication failed: {message}")]
    Auth {
        /// Provider tag.
        provider: ProviderKind,
        /// What went wrong.
        message: String,
    },

    /// The requested voice id is unknown to the provider. Not retryable.
    #[error("{provider} does not know voice '{voice}'")]
    UnknownVoice {
        /// Provider tag.
        provider: ProviderKind,
        /// The voice id that failed to resolve.
        voice: String,
    },

    /// The provider answered but the payload was empty or undecodable.
    #[error("{provider} returned an unusable payload: {message}")]
    BadPayload {
        /// Provider tag.
        provider: ProviderKind,
        /// What was wrong with the payload.
        message: String,
    },

    /// Transport-level failure before an HTTP status was available.
    #[error("network error talking to {provider}: {message}")]
    Network {
        /// Provider tag.
        provider: ProviderKind,
        /// Underlying error text.
        message: String,
    },

    /// The call observed cancellation.
    #[error("synthesis canceled")]
    Canceled,
}

impl SpeechError {
    /// Whether the retry helper may re-attempt this error.
    ///
    /// Limited to HTTP 429 and HTTP 5xx; everything else aborts immediately.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Port trait every speech provider implements.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Provider tag.
    fn name(&self) -> ProviderKind;

    /// Default three-slot voice map for this provider.
    fn default_voices(&self) -> VoiceMap;

    /// Selectable voice catalog for the `list_voices` surface.
    fn voice_catalog(&self) -> Vec<VoiceInfo>;

    /// Declared rate limits.
    fn limits(&self) -> ProviderLimits;

    /// Synthesize one segment with one voice.
    async fn synthesize(&self, text: &str, voice: &Voice) -> Result<AudioResult, SpeechError>;

    /// Batch capability feature-test. Default: not batch-capable.
    fn as_batch(&self) -> Option<&dyn BatchSynthesizer> {
        None
    }

    /// Release any held connections. Default: nothing to do.
    async fn close(&self) {}
}

/// Optional capability: synthesize an entire multi-speaker script in one call.
#[async_trait]
pub trait BatchSynthesizer: Send + Sync {
    /// Produce a single audio payload for the whole script.
    async fn synthesize_batch(
        &self,
        script: &Script,
        voices: &VoiceMap,
    ) -> Result<AudioResult, SpeechError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        let rate = SpeechError::RateLimited {
            provider: ProviderKind::Gemini,
        };
        assert!(rate.is_retryable());

        let server = SpeechError::Upstream {
            provider: ProviderKind::Openai,
            status: 503,
            message: "overloaded".into(),
        };
        assert!(server.is_retryable());

        let client = SpeechError::Upstream {
            provider: ProviderKind::Openai,
            status: 400,
            message: "bad voice".into(),
        };
        assert!(!client.is_retryable());

        let net = SpeechError::Network {
            provider: ProviderKind::Vertex,
            message: "connection reset".into(),
        };
        assert!(!net.is_retryable());
    }

    #[test]
    fn min_interval_from_rpm() {
        let limits = ProviderLimits {
            rpm: 10,
            batch_rpd: Some(100),
        };
        assert_eq!(limits.min_interval(), std::time::Duration::from_secs(6));
        assert_eq!(ProviderLimits::default().min_interval(), std::time::Duration::ZERO);
    }

    #[test]
    fn pcm_segments_use_raw_extension() {
        assert_eq!(AudioFormat::Mp3.extension(), "mp3");
        assert_eq!(AudioFormat::Pcm24k.extension(), "raw");
        assert_eq!(AudioFormat::Wav.extension(), "raw");
    }
}
