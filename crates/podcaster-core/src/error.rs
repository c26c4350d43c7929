//! Stage-tagged pipeline errors.
//!
//! Every stage wraps its inner failure with a stage tag and a one-line
//! message; the worker persists that string verbatim on the job record.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipeline stage tags, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Source ingestion.
    Ingest,
    /// Script generation.
    Script,
    /// Text-to-speech synthesis.
    Tts,
    /// Silence insertion and concatenation.
    Assembly,
    /// Artifact publication.
    Upload,
}

impl Stage {
    /// Canonical lowercase tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ingest => "ingest",
            Self::Script => "script",
            Self::Tts => "tts",
            Self::Assembly => "assembly",
            Self::Upload => "upload",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stage failure with a one-line human message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{stage} stage failed: {message}")]
pub struct StageError {
    /// Which stage failed.
    pub stage: Stage,
    /// One-line description, persisted verbatim.
    pub message: String,
}

impl StageError {
    /// Wrap an inner error with a stage tag.
    pub fn new(stage: Stage, message: impl fmt::Display) -> Self {
        Self {
            stage,
            message: message.to_string(),
        }
    }
}

/// Terminal outcome of a pipeline run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// A stage failed after its own retry policy was exhausted.
    #[error(transparent)]
    Stage(#[from] StageError),

    /// The job observed shutdown or per-job cancellation.
    #[error("canceled")]
    Canceled,
}

impl PipelineError {
    /// The stage tag, when the failure belongs to a stage.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage(e) => Some(e.stage),
            Self::Canceled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_error_message_carries_tag() {
        let err = StageError::new(Stage::Tts, "provider returned 500");
        assert_eq!(err.to_string(), "tts stage failed: provider returned 500");
    }

    #[test]
    fn canceled_renders_plainly() {
        assert_eq!(PipelineError::Canceled.to_string(), "canceled");
        assert_eq!(PipelineError::Canceled.stage(), None);
    }

    #[test]
    fn stage_tags_are_lowercase() {
        assert_eq!(Stage::Assembly.as_str(), "assembly");
        assert_eq!(
            serde_json::to_string(&Stage::Ingest).unwrap(),
            "\"ingest\""
        );
    }
}
