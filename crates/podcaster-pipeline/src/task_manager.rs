//! Asynchronous task manager.
//!
//! Admission-controlled job runner. Accepted jobs get a fresh identifier,
//! an initial `submitted` record, and a detached worker whose lifetime is
//! rooted in the process-shutdown token, so a disconnecting caller never
//! aborts generation. The request's trace id is carried into the worker's
//! span for observability only.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};

use podcaster_core::{
    EpisodeSpec, JobConfig, JobId, JobRecord, JobStatus, JobStore, JobStoreError, JobUpdate,
    PipelineError,
};

use crate::observer::{RunObserver, StoreObserver};
use crate::orchestrator::{Orchestrator, RunOutcome};

/// Default worker cap.
pub const DEFAULT_MAX_TASKS: usize = 5;

/// Errors from job admission.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The concurrency cap is reached; the caller may retry later.
    #[error("server busy: {running} of {max} generation slots in use, retry later")]
    Busy {
        /// Jobs currently running.
        running: usize,
        /// The configured cap.
        max: usize,
    },

    /// The process is shutting down; no new work is accepted.
    #[error("server is shutting down")]
    ShuttingDown,

    /// The request is structurally invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Writing the initial job record failed.
    #[error(transparent)]
    Store(#[from] JobStoreError),
}

/// Pipeline execution seam, implemented by [`Orchestrator`].
///
/// Exists so the task manager's admission and lifecycle logic can be tested
/// against a scripted pipeline.
#[async_trait]
pub trait PipelineRunner: Send + Sync {
    /// Execute the pipeline for one job.
    async fn run(
        &self,
        job_id: &JobId,
        spec: &EpisodeSpec,
        cancel: &CancellationToken,
        observer: &dyn RunObserver,
    ) -> Result<RunOutcome, PipelineError>;
}

#[async_trait]
impl PipelineRunner for Orchestrator {
    async fn run(
        &self,
        job_id: &JobId,
        spec: &EpisodeSpec,
        cancel: &CancellationToken,
        observer: &dyn RunObserver,
    ) -> Result<RunOutcome, PipelineError> {
        Self::run(self, job_id, spec, cancel, observer).await
    }
}

/// Bounded-concurrency job manager.
pub struct TaskManager {
    runner: Arc<dyn PipelineRunner>,
    store: Arc<dyn JobStore>,
    shutdown: CancellationToken,
    max_tasks: usize,
    running: Arc<AtomicUsize>,
}

impl TaskManager {
    /// Create a manager over a runner and store.
    ///
    /// `shutdown` is the process-wide token; cancelling it stops admission
    /// and cancels in-flight workers.
    pub fn new(
        runner: Arc<dyn PipelineRunner>,
        store: Arc<dyn JobStore>,
        shutdown: CancellationToken,
        max_tasks: usize,
    ) -> Self {
        Self {
            runner,
            store,
            shutdown,
            max_tasks: max_tasks.max(1),
            running: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Jobs currently in flight.
    #[must_use]
    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// The configured concurrency cap.
    #[must_use]
    pub const fn max_tasks(&self) -> usize {
        self.max_tasks
    }

    /// Validate, admit and launch a generation job.
    ///
    /// Returns the job id immediately; the worker continues in the
    /// background, detached from the caller's lifetime.
    pub async fn start(
        &self,
        spec: EpisodeSpec,
        owner: impl Into<String>,
        trace_id: Option<String>,
    ) -> Result<JobId, TaskError> {
        if self.shutdown.is_cancelled() {
            return Err(TaskError::ShuttingDown);
        }
        validate(&spec)?;

        // Claim a slot; give it back if anything below fails.
        let running = self.running.fetch_add(1, Ordering::SeqCst);
        if running >= self.max_tasks {
            self.running.fetch_sub(1, Ordering::SeqCst);
            return Err(TaskError::Busy {
                running,
                max: self.max_tasks,
            });
        }

        let id = JobId::generate();
        let record = JobRecord::submitted(
            id.clone(),
            owner,
            JobConfig {
                model: spec.model.clone(),
                tts: spec.tts,
                duration: spec.duration,
                format: spec.format,
                voices: spec.voices,
            },
        );
        if let Err(e) = self.store.create(&record).await {
            self.running.fetch_sub(1, Ordering::SeqCst);
            return Err(e.into());
        }

        info!(job_id = %id, "accepted generation job");
        self.spawn_worker(id.clone(), spec, trace_id);
        Ok(id)
    }

    fn spawn_worker(&self, id: JobId, spec: EpisodeSpec, trace_id: Option<String>) {
        let runner = Arc::clone(&self.runner);
        let store = Arc::clone(&self.store);
        let running = Arc::clone(&self.running);
        // Worker lifetime chains to process shutdown, not the RPC call.
        let cancel = self.shutdown.child_token();

        let span = info_span!(
            "podcast_worker",
            job_id = %id,
            trace_id = trace_id.as_deref().unwrap_or("")
        );

        tokio::spawn(
            async move {
                let observer = StoreObserver::new(Arc::clone(&store), id.clone());

                best_effort_update(&store, &id, JobUpdate::status(JobStatus::Processing)).await;

                let result = runner.run(&id, &spec, &cancel, &observer).await;

                let update = match result {
                    Ok(outcome) => completion_update(&outcome),
                    Err(e) => {
                        error!(job_id = %id, error = %e, "generation failed");
                        JobUpdate::failed(e.to_string())
                    }
                };
                best_effort_update(&store, &id, update).await;

                running.fetch_sub(1, Ordering::SeqCst);
            }
            .instrument(span),
        );
    }

    /// Stop accepting work and cancel in-flight jobs.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Wait until all workers drained, polling the running gauge.
    pub async fn wait_idle(&self) {
        while self.running() > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
    }
}

fn completion_update(outcome: &RunOutcome) -> JobUpdate {
    let mut update = JobUpdate {
        status: Some(JobStatus::Completed),
        progress_percent: Some(100),
        stage_message: Some("completed".to_string()),
        title: Some(outcome.title.clone()),
        summary: Some(outcome.summary.clone()),
        ..JobUpdate::default()
    };
    if let Some(ref episode) = outcome.episode {
        update.audio_url = Some(episode.url.clone());
        update.duration_secs = Some(episode.duration_secs);
        update.file_size_bytes = Some(episode.file_size_bytes);
    }
    update
}

async fn best_effort_update(store: &Arc<dyn JobStore>, id: &JobId, update: JobUpdate) {
    if let Err(e) = store.update(id, update).await {
        error!(job_id = %id, error = %e, "job record update failed");
    }
}

fn validate(spec: &EpisodeSpec) -> Result<(), TaskError> {
    let inputs =
        usize::from(spec.source.is_some()) + usize::from(spec.input_text.is_some());
    if spec.from_script.is_none() && inputs != 1 {
        return Err(TaskError::InvalidRequest(
            "exactly one of input_url or input_text is required".to_string(),
        ));
    }
    if spec.model.trim().is_empty() {
        return Err(TaskError::InvalidRequest("model must not be empty".to_string()));
    }
    if !(1..=3).contains(&spec.voices) {
        return Err(TaskError::InvalidRequest(format!(
            "voices must be 1-3, got {}",
            spec.voices
        )));
    }
    Ok(())
}
