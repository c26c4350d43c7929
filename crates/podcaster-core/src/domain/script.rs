//! Dialogue script produced by the generator.
//!
//! The persisted JSON shape (`title`, `summary`, `segments[]`) is a stable
//! wire format: it is written to `scripts/<name>.json` before TTS starts and
//! re-read on `from-script` runs, so changes here must stay
//! backward-compatible.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Spoken words per minute used for the duration estimate.
const WORDS_PER_MINUTE: usize = 150;

/// One spoken turn in the dialogue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Name of the host speaking this turn. Must be a member of the roster.
    pub speaker: String,
    /// The words to synthesize. Never blank in a valid script.
    pub text: String,
}

impl Segment {
    /// Create a new segment.
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

/// A complete episode script: ordered segments plus display metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Episode title.
    pub title: String,
    /// One-paragraph episode summary.
    pub summary: String,
    /// Dialogue turns in playback order. Order is preserved end-to-end.
    pub segments: Vec<Segment>,
}

/// Errors raised when validating or persisting a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script has no segments at all.
    #[error("script contains no segments")]
    Empty,

    /// A segment references a speaker outside the active roster.
    #[error("segment {index} speaker '{speaker}' is not in the active roster")]
    UnknownSpeaker {
        /// 0-based segment index.
        index: usize,
        /// The offending speaker name.
        speaker: String,
    },

    /// A segment has blank text.
    #[error("segment {index} has blank text")]
    BlankText {
        /// 0-based segment index.
        index: usize,
    },

    /// Reading or writing the persisted script file failed.
    #[error("script file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted script file is not valid JSON of the expected shape.
    #[error("script file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl Script {
    /// Validate the structural invariants against the active roster names.
    ///
    /// A valid script has at least one segment, every speaker is a roster
    /// member and every text is non-blank.
    pub fn validate(&self, roster_names: &[&str]) -> Result<(), ScriptError> {
        if self.segments.is_empty() {
            return Err(ScriptError::Empty);
        }

        for (index, segment) in self.segments.iter().enumerate() {
            if !roster_names.contains(&segment.speaker.as_str()) {
                return Err(ScriptError::UnknownSpeaker {
                    index,
                    speaker: segment.speaker.clone(),
                });
            }
            if segment.text.trim().is_empty() {
                return Err(ScriptError::BlankText { index });
            }
        }

        Ok(())
    }

    /// Total word count across all segments.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.segments
            .iter()
            .map(|s| s.text.split_whitespace().count())
            .sum()
    }

    /// Estimated spoken duration in minutes: `ceil(total_words / 150)`.
    #[must_use]
    pub fn estimated_minutes(&self) -> u64 {
        let words = self.word_count();
        (words as u64).div_ceil(WORDS_PER_MINUTE as u64)
    }

    /// Persist the script as pretty-printed JSON.
    pub async fn save(&self, path: &Path) -> Result<(), ScriptError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Load a previously persisted script.
    pub async fn load(path: &Path) -> Result<Self, ScriptError> {
        let json = tokio::fs::read_to_string(path).await?;
        let script: Self = serde_json::from_str(&json)?;
        Ok(script)
    }
}
