//! Progress events and the stage percent mapping.
//!
//! Stage boundaries and per-segment TTS steps emit advisory events.
//! Consumers must tolerate non-monotonic percentages during retries.

use std::time::Duration;

use crate::error::Stage;

/// One progress event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Stage the event belongs to.
    pub stage: Stage,
    /// Overall percent, 0–100.
    pub percent: u8,
    /// Human-readable step description.
    pub message: String,
    /// Time since the pipeline run started.
    pub elapsed: Duration,
}

/// Percent reached when ingest completes.
pub const PERCENT_INGEST_DONE: u8 = 10;
/// Percent reached when the script is generated and persisted.
pub const PERCENT_SCRIPT_DONE: u8 = 30;
/// Percent reached when assembly completes.
pub const PERCENT_ASSEMBLY_DONE: u8 = 95;
/// Percent reached when the artifact is published.
pub const PERCENT_UPLOAD_DONE: u8 = 100;

/// Percent for TTS progress after `done` of `total` segments:
/// `30 + 60 * done / total`.
#[must_use]
pub fn tts_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return PERCENT_SCRIPT_DONE;
    }
    let span = 60.0 * (done as f64) / (total as f64);
    PERCENT_SCRIPT_DONE.saturating_add(span.round() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tts_percent_spans_30_to_90() {
        assert_eq!(tts_percent(0, 8), 30);
        assert_eq!(tts_percent(4, 8), 60);
        assert_eq!(tts_percent(8, 8), 90);
    }

    #[test]
    fn tts_percent_handles_zero_total() {
        assert_eq!(tts_percent(0, 0), PERCENT_SCRIPT_DONE);
    }
}
