//! Job store port: durable job records behind a trait.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{JobId, JobRecord, JobUpdate};

/// Errors returned by [`JobStore`] operations.
#[derive(Debug, Error)]
pub enum JobStoreError {
    /// The referenced job does not exist.
    #[error("job '{0}' not found")]
    NotFound(String),

    /// The backing store failed.
    #[error("job store error: {0}")]
    Storage(String),
}

/// One page of a newest-first job listing.
#[derive(Clone, Debug, Default)]
pub struct JobPage {
    /// Jobs in reverse-chronological order.
    pub jobs: Vec<JobRecord>,
    /// Opaque token for the next page; `None` when exhausted.
    pub next_cursor: Option<String>,
}

/// Port trait for the durable job store.
///
/// The store does not police state transitions; maintaining status
/// monotonicity is the owning worker's responsibility. Progress updates are
/// best-effort: callers treat a failed [`update`](JobStore::update) as
/// non-fatal for the job.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a freshly accepted job record.
    async fn create(&self, job: &JobRecord) -> Result<(), JobStoreError>;

    /// Apply a partial update to an existing record.
    async fn update(&self, id: &JobId, update: JobUpdate) -> Result<(), JobStoreError>;

    /// Fetch one record, `None` when unknown.
    async fn get(&self, id: &JobId) -> Result<Option<JobRecord>, JobStoreError>;

    /// List records newest-first. An invalid cursor restarts from the top.
    async fn list(&self, limit: u32, cursor: Option<&str>) -> Result<JobPage, JobStoreError>;

    /// Metadata enrichment permitted on terminal records.
    async fn increment_play_count(&self, id: &JobId) -> Result<(), JobStoreError>;
}
