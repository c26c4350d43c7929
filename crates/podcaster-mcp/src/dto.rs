//! Wire shapes for the tool surface.
//!
//! Requests tolerate unknown fields (serde's default behavior); enum-valued
//! fields arrive as strings and are parsed with the domain `FromStr` impls.

use serde::{Deserialize, Serialize};

use podcaster_core::{
    DurationPreset, EpisodeFormat, EpisodeSpec, JobRecord, ProviderKind, Style, Tone, VoiceInfo,
};

use crate::error::ServiceError;

/// Default language model when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "gpt-5-mini";

/// Arguments of `generate_podcast`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    /// Source URL (or PDF/text path). Exactly one of this and `input_text`.
    pub input_url: Option<String>,
    /// Inline source text.
    pub input_text: Option<String>,
    /// Language model id.
    pub model: Option<String>,
    /// TTS provider tag.
    pub tts: Option<String>,
    /// Tone label.
    pub tone: Option<String>,
    /// Duration preset label.
    pub duration: Option<String>,
    /// Episode format label.
    pub format: Option<String>,
    /// Active host count (1–3).
    pub voices: Option<u8>,
    /// Optional topic focus.
    pub topic: Option<String>,
    /// Style labels.
    #[serde(default)]
    pub style: Vec<String>,
    /// Per-slot voice override (`voice-id` or `provider:voice-id`).
    pub voice1: Option<String>,
    /// Per-slot voice override.
    pub voice2: Option<String>,
    /// Per-slot voice override.
    pub voice3: Option<String>,
    /// Per-request language-model API key override.
    pub llm_api_key: Option<String>,
    /// Skip the batch synthesis path for this run.
    #[serde(default)]
    pub disable_batch: bool,
}

impl GenerateRequest {
    /// Convert to the domain spec, parsing enum labels.
    pub fn into_spec(self) -> Result<EpisodeSpec, ServiceError> {
        let tone = match self.tone {
            Some(ref raw) => raw
                .parse::<Tone>()
                .map_err(ServiceError::InvalidParams)?,
            None => Tone::default(),
        };
        let duration = match self.duration {
            Some(ref raw) => raw
                .parse::<DurationPreset>()
                .map_err(ServiceError::InvalidParams)?,
            None => DurationPreset::default(),
        };
        let format = match self.format {
            Some(ref raw) => raw
                .parse::<EpisodeFormat>()
                .map_err(ServiceError::InvalidParams)?,
            None => EpisodeFormat::default(),
        };
        let tts = match self.tts {
            Some(ref raw) => raw
                .parse::<ProviderKind>()
                .map_err(ServiceError::InvalidParams)?,
            None => ProviderKind::default(),
        };
        let styles = self
            .style
            .iter()
            .map(|raw| raw.parse::<Style>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(ServiceError::InvalidParams)?;

        Ok(EpisodeSpec {
            source: self.input_url,
            input_text: self.input_text,
            from_script: None,
            script_only: false,
            topic: self.topic,
            tone,
            duration,
            styles,
            format,
            voices: self.voices.unwrap_or(2),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            tts,
            voice_overrides: [self.voice1, self.voice2, self.voice3],
            disable_batch: self.disable_batch,
            llm_api_key: self.llm_api_key,
        })
    }
}

/// Result of `generate_podcast`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The allocated job id.
    pub podcast_id: String,
    /// Always `"submitted"`.
    pub status: String,
}

/// Result of `get_podcast` and the list items of `list_podcasts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodcastStatus {
    /// Job id.
    pub podcast_id: String,
    /// Lifecycle status label.
    pub status: String,
    /// Progress percent (0–100).
    pub progress_percent: u8,
    /// Current stage message.
    pub stage_message: String,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Episode title, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Episode summary, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Published URL, once uploaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// File size in megabytes, rounded to 2 decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_mb: Option<f64>,
    /// Stage-tagged error for failed jobs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Configured language model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Configured TTS provider tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_provider: Option<String>,
    /// Configured episode format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl From<JobRecord> for PodcastStatus {
    fn from(record: JobRecord) -> Self {
        let file_size_mb = record
            .file_size_bytes
            .map(|bytes| (bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0);
        Self {
            podcast_id: record.id.as_str().to_string(),
            status: record.status.as_str().to_string(),
            progress_percent: record.progress_percent,
            stage_message: record.stage_message,
            created_at: record.created_at.to_rfc3339(),
            title: record.title,
            summary: record.summary,
            audio_url: record.audio_url,
            duration: record.duration_secs,
            file_size_mb,
            error: record.error,
            model: Some(record.config.model),
            tts_provider: Some(record.config.tts.as_str().to_string()),
            format: Some(record.config.format.as_str().to_string()),
        }
    }
}

/// Result of `list_podcasts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    /// Jobs, newest first.
    pub podcasts: Vec<PodcastStatus>,
    /// Number of items in this page.
    pub count: usize,
    /// Cursor for the next page, when more remain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Result of `list_voices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoicesResponse {
    /// Provider tag the voices belong to.
    pub provider: String,
    /// Selectable voices.
    pub voices: Vec<VoiceInfo>,
}

/// Result of `list_options`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsResponse {
    /// Episode format labels.
    pub formats: Vec<String>,
    /// Style labels.
    pub styles: Vec<String>,
    /// TTS provider tags.
    pub tts: Vec<String>,
    /// Suggested language models.
    pub models: Vec<String>,
    /// Duration preset labels.
    pub durations: Vec<String>,
}

/// Result of `server_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfoResponse {
    /// Crate version.
    pub version: String,
    /// Jobs currently in flight.
    pub running_tasks: usize,
    /// Concurrency cap.
    pub max_tasks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_are_ignored() {
        let request: GenerateRequest = serde_json::from_value(json!({
            "input_text": "words",
            "tone": "technical",
            "some_future_field": 42,
        }))
        .unwrap();
        let spec = request.into_spec().unwrap();
        assert_eq!(spec.tone, Tone::Technical);
        assert_eq!(spec.model, DEFAULT_MODEL);
        assert_eq!(spec.voices, 2);
    }

    #[test]
    fn bad_enum_label_is_invalid_params() {
        let request: GenerateRequest = serde_json::from_value(json!({
            "input_text": "words",
            "duration": "epic",
        }))
        .unwrap();
        assert!(matches!(
            request.into_spec(),
            Err(ServiceError::InvalidParams(_))
        ));
    }

    #[test]
    fn file_size_is_rounded_to_megabytes() {
        use podcaster_core::{JobConfig, JobId};

        let mut record = JobRecord::submitted(
            JobId::from_string("pc_x"),
            "o",
            JobConfig {
                model: "m".into(),
                tts: ProviderKind::Gemini,
                duration: DurationPreset::Short,
                format: EpisodeFormat::Conversation,
                voices: 2,
            },
        );
        record.file_size_bytes = Some(5_242_880); // exactly 5 MiB

        let status = PodcastStatus::from(record);
        assert_eq!(status.file_size_mb, Some(5.0));
        assert_eq!(status.tts_provider.as_deref(), Some("gemini"));
    }
}
