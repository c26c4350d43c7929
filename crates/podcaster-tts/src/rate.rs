//! Per-provider request pacing.
//!
//! For a provider declaring R requests per minute, sequential synthesis
//! calls within one job are spaced at least 60/R seconds apart.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Paces calls to one provider within one job.
pub struct RateGate {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateGate {
    /// Gate with a fixed minimum interval. Zero disables pacing.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Wait until the next call is permitted, then claim the slot.
    pub async fn wait(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let mut last = self.last_call.lock().await;
        if let Some(previous) = *last {
            let due = previous + self.min_interval;
            let now = Instant::now();
            if due > now {
                let pause = due - now;
                debug!(pause_ms = pause.as_millis() as u64, "pacing provider call");
                tokio::time::sleep_until(due).await;
            }
        }
        *last = Some(Instant::now());
    }
}
