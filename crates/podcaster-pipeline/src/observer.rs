//! Run observers.
//!
//! The orchestrator reports progress and script metadata through a
//! [`RunObserver`]; the task manager plugs in a store-backed observer that
//! turns events into best-effort, throttled job-record updates.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use podcaster_core::{
    JobId, JobStore, JobUpdate, ProgressEvent, PERCENT_ASSEMBLY_DONE, PERCENT_INGEST_DONE,
    PERCENT_SCRIPT_DONE, PERCENT_UPLOAD_DONE,
};

/// Observer seam between the orchestrator and its caller.
pub trait RunObserver: Send + Sync {
    /// A stage or substage boundary was reached.
    fn progress(&self, event: ProgressEvent);

    /// The script stage finished; title and summary are known.
    fn script_ready(&self, _title: &str, _summary: &str) {}
}

/// Observer that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn progress(&self, _event: ProgressEvent) {}
}

/// Minimum spacing between persisted per-segment progress writes.
const WRITE_INTERVAL: Duration = Duration::from_millis(250);

/// Store-backed observer: persists progress to the job record.
///
/// Writes are best-effort (a failed update never fails the job) and
/// throttled, except at stage boundaries which are always persisted.
pub struct StoreObserver {
    store: Arc<dyn JobStore>,
    id: JobId,
    last_write: Mutex<Option<Instant>>,
}

impl StoreObserver {
    /// Create an observer for one job.
    pub fn new(store: Arc<dyn JobStore>, id: JobId) -> Self {
        Self {
            store,
            id,
            last_write: Mutex::new(None),
        }
    }

    fn should_write(&self, percent: u8) -> bool {
        // Stage boundaries always land; per-segment steps are throttled.
        let boundary = matches!(
            percent,
            PERCENT_INGEST_DONE | PERCENT_SCRIPT_DONE | PERCENT_ASSEMBLY_DONE
                | PERCENT_UPLOAD_DONE
        );
        if boundary {
            return true;
        }

        let mut last = match self.last_write.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Instant::now();
        match *last {
            Some(previous) if now.duration_since(previous) < WRITE_INTERVAL => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    fn spawn_update(&self, update: JobUpdate) {
        let store = Arc::clone(&self.store);
        let id = self.id.clone();
        tokio::spawn(async move {
            if let Err(e) = store.update(&id, update).await {
                debug!(job_id = %id, error = %e, "best-effort progress write failed");
            }
        });
    }
}

impl RunObserver for StoreObserver {
    fn progress(&self, event: ProgressEvent) {
        if !self.should_write(event.percent) {
            return;
        }
        self.spawn_update(JobUpdate::progress(event.percent, event.message));
    }

    fn script_ready(&self, title: &str, summary: &str) {
        self.spawn_update(JobUpdate {
            title: Some(title.to_string()),
            summary: Some(summary.to_string()),
            ..JobUpdate::default()
        });
    }
}
