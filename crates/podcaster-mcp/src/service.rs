//! High-level podcast service behind the tool surface.
//!
//! Uses dependency injection for the task manager and job store so the
//! handlers can be exercised against fakes.

use std::sync::Arc;

use tracing::info;

use podcaster_core::{
    DurationPreset, EpisodeFormat, JobId, JobStore, ProviderKind, Style,
};
use podcaster_pipeline::TaskManager;
use podcaster_tts::voice_catalog;

use crate::dto::{
    GenerateRequest, GenerateResponse, ListResponse, OptionsResponse, PodcastStatus,
    ServerInfoResponse, VoicesResponse, DEFAULT_MODEL,
};
use crate::error::ServiceError;

/// Suggested language models for `list_options`.
const SUGGESTED_MODELS: &[&str] = &[DEFAULT_MODEL, "gpt-5", "gpt-4.1", "gpt-4o"];

/// Default page size for `list_podcasts`.
const DEFAULT_LIST_LIMIT: u32 = 20;

/// The service the RPC transport delegates to.
pub struct PodcastService {
    tasks: Arc<TaskManager>,
    store: Arc<dyn JobStore>,
}

impl PodcastService {
    /// Create a service with injected dependencies.
    pub fn new(tasks: Arc<TaskManager>, store: Arc<dyn JobStore>) -> Self {
        Self { tasks, store }
    }

    /// `generate_podcast`: validate, admit, return the id immediately.
    pub async fn generate(
        &self,
        request: GenerateRequest,
        owner: &str,
        trace_id: Option<String>,
    ) -> Result<GenerateResponse, ServiceError> {
        let spec = request.into_spec()?;
        let id = self.tasks.start(spec, owner, trace_id).await?;
        info!(podcast_id = %id, owner, "submitted podcast generation");
        Ok(GenerateResponse {
            podcast_id: id.as_str().to_string(),
            status: "submitted".to_string(),
        })
    }

    /// `get_podcast`: read one job record.
    pub async fn get(&self, podcast_id: &str) -> Result<PodcastStatus, ServiceError> {
        let id = JobId::from_string(podcast_id);
        let record = self
            .store
            .get(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(podcast_id.to_string()))?;
        Ok(record.into())
    }

    /// `list_podcasts`: newest-first page.
    pub async fn list(
        &self,
        limit: Option<u32>,
        cursor: Option<&str>,
    ) -> Result<ListResponse, ServiceError> {
        let page = self
            .store
            .list(limit.unwrap_or(DEFAULT_LIST_LIMIT), cursor)
            .await?;
        let podcasts: Vec<PodcastStatus> = page.jobs.into_iter().map(Into::into).collect();
        Ok(ListResponse {
            count: podcasts.len(),
            podcasts,
            next_cursor: page.next_cursor,
        })
    }

    /// `list_voices`: catalog for one provider tag.
    pub fn voices(&self, provider: &str) -> Result<VoicesResponse, ServiceError> {
        let kind: ProviderKind = provider.parse().map_err(ServiceError::InvalidParams)?;
        Ok(VoicesResponse {
            provider: kind.as_str().to_string(),
            voices: voice_catalog(kind),
        })
    }

    /// `list_options`: every accepted label set.
    #[must_use]
    pub fn options(&self) -> OptionsResponse {
        OptionsResponse {
            formats: EpisodeFormat::ALL.iter().map(|f| f.as_str().to_string()).collect(),
            styles: Style::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            tts: ProviderKind::ALL.iter().map(|p| p.as_str().to_string()).collect(),
            models: SUGGESTED_MODELS.iter().map(ToString::to_string).collect(),
            durations: DurationPreset::ALL.iter().map(|d| d.as_str().to_string()).collect(),
        }
    }

    /// `server_info`: version and load.
    #[must_use]
    pub fn server_info(&self) -> ServerInfoResponse {
        ServerInfoResponse {
            version: env!("CARGO_PKG_VERSION").to_string(),
            running_tasks: self.tasks.running(),
            max_tasks: self.tasks.max_tasks(),
        }
    }
}
