//! Durable job records.
//!
//! A job record is created when a request is accepted and mutated only by
//! the worker that owns the job. Status advances monotonically along
//! `submitted → processing → (completed | failed)`; terminal states never
//! change again except for metadata enrichment (play count).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::options::{DurationPreset, EpisodeFormat};
use crate::domain::voice::ProviderKind;

/// Unique podcast job identifier.
///
/// Format: `pc_<base36 unix-millis><first 8 uuid hex>`, sortable by
/// creation time, collision-resistant across processes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Allocate a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        let uuid = Uuid::new_v4().simple().to_string();
        Self(format!("pc_{}{}", to_base36(millis), &uuid[..8]))
    }

    /// Wrap an existing identifier string (e.g. read back from the store).
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short suffix used to namespace per-job file names.
    #[must_use]
    pub fn suffix(&self) -> &str {
        let len = self.0.len();
        &self.0[len.saturating_sub(8)..]
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ASCII")
}

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, worker not yet running.
    #[default]
    Submitted,
    /// Worker is executing pipeline stages.
    Processing,
    /// Final audio published.
    Completed,
    /// A stage failed; `error` carries the stage-tagged message.
    Failed,
}

impl JobStatus {
    /// Whether this status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Canonical lowercase label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration snapshot captured when the job is accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Language model identifier.
    pub model: String,
    /// TTS provider tag.
    pub tts: ProviderKind,
    /// Duration preset.
    pub duration: DurationPreset,
    /// Episode format.
    pub format: EpisodeFormat,
    /// Active host count.
    pub voices: u8,
}

/// The persisted job record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Job identifier.
    pub id: JobId,
    /// Owner identifier supplied by the caller surface.
    pub owner: String,
    /// Current lifecycle status.
    pub status: JobStatus,
    /// Progress percent, 0–100. Advisory; may regress during retries.
    pub progress_percent: u8,
    /// Human-readable description of the current stage.
    pub stage_message: String,
    /// Episode title, populated after the script stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Episode summary, populated after the script stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Public URL of the uploaded episode, populated after upload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Final audio duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    /// Final audio file size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,
    /// Stage-tagged error message for failed jobs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Configuration snapshot.
    pub config: JobConfig,
    /// Play count, enriched after completion.
    #[serde(default)]
    pub play_count: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl JobRecord {
    /// Create the initial `submitted` record for a freshly accepted job.
    #[must_use]
    pub fn submitted(id: JobId, owner: impl Into<String>, config: JobConfig) -> Self {
        Self {
            id,
            owner: owner.into(),
            status: JobStatus::Submitted,
            progress_percent: 0,
            stage_message: "queued".to_string(),
            title: None,
            summary: None,
            audio_url: None,
            duration_secs: None,
            file_size_bytes: None,
            error: None,
            config,
            play_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, update: &JobUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(percent) = update.progress_percent {
            self.progress_percent = percent.min(100);
        }
        if let Some(ref message) = update.stage_message {
            self.stage_message.clone_from(message);
        }
        if let Some(ref title) = update.title {
            self.title = Some(title.clone());
        }
        if let Some(ref summary) = update.summary {
            self.summary = Some(summary.clone());
        }
        if let Some(ref url) = update.audio_url {
            self.audio_url = Some(url.clone());
        }
        if let Some(duration) = update.duration_secs {
            self.duration_secs = Some(duration);
        }
        if let Some(size) = update.file_size_bytes {
            self.file_size_bytes = Some(size);
        }
        if let Some(ref error) = update.error {
            self.error = Some(error.clone());
        }
    }
}

/// Partial update to a job record. Unset fields are left untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JobUpdate {
    /// New status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    /// New progress percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_percent: Option<u8>,
    /// New stage message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_message: Option<String>,
    /// Episode title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Episode summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Published audio URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Final duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    /// Final file size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,
    /// Stage-tagged error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobUpdate {
    /// Update carrying only a status change.
    #[must_use]
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Update carrying a progress step.
    #[must_use]
    pub fn progress(percent: u8, message: impl Into<String>) -> Self {
        Self {
            progress_percent: Some(percent.min(100)),
            stage_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Terminal failure update with the stage-tagged error message.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Set the status on an existing update.
    #[must_use]
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JobConfig {
        JobConfig {
            model: "m".into(),
            tts: ProviderKind::Gemini,
            duration: DurationPreset::Short,
            format: EpisodeFormat::Conversation,
            voices: 2,
        }
    }

    #[test]
    fn generated_ids_are_unique_and_prefixed() {
        let a = JobId::generate();
        let b = JobId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("pc_"));
        assert_eq!(a.suffix().len(), 8);
    }

    #[test]
    fn base36_encodes_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn apply_merges_partial_updates() {
        let mut record = JobRecord::submitted(JobId::generate(), "cli", config());

        record.apply(&JobUpdate::progress(30, "script generated"));
        assert_eq!(record.progress_percent, 30);
        assert_eq!(record.stage_message, "script generated");
        assert_eq!(record.status, JobStatus::Submitted);

        record.apply(&JobUpdate::failed("tts stage failed: boom"));
        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("tts stage failed: boom"));
        // Earlier fields untouched.
        assert_eq!(record.progress_percent, 30);
    }

    #[test]
    fn progress_is_clamped_to_100() {
        let mut record = JobRecord::submitted(JobId::generate(), "cli", config());
        record.apply(&JobUpdate::progress(250, "overflow"));
        assert_eq!(record.progress_percent, 100);
    }

    #[test]
    fn terminal_statuses() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(!JobStatus::Submitted.is_terminal());
    }
}
