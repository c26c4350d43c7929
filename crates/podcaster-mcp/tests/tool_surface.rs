//! End-to-end tool-surface tests over an in-memory store and scripted runner.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use podcaster_core::{
    EpisodeSpec, JobId, JobPage, JobRecord, JobStore, JobStoreError, JobUpdate, PipelineError,
};
use podcaster_mcp::{CallContext, PodcastService, ServiceError, ToolRegistry};
use podcaster_pipeline::{PipelineRunner, RunObserver, RunOutcome, TaskManager};

#[derive(Default)]
struct MemoryStore {
    records: Mutex<HashMap<String, JobRecord>>,
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create(&self, job: &JobRecord) -> Result<(), JobStoreError> {
        self.records
            .lock()
            .unwrap()
            .insert(job.id.as_str().to_string(), job.clone());
        Ok(())
    }

    async fn update(&self, id: &JobId, update: JobUpdate) -> Result<(), JobStoreError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(id.as_str())
            .ok_or_else(|| JobStoreError::NotFound(id.to_string()))?;
        record.apply(&update);
        Ok(())
    }

    async fn get(&self, id: &JobId) -> Result<Option<JobRecord>, JobStoreError> {
        Ok(self.records.lock().unwrap().get(id.as_str()).cloned())
    }

    async fn list(&self, limit: u32, _cursor: Option<&str>) -> Result<JobPage, JobStoreError> {
        let mut jobs: Vec<JobRecord> = self.records.lock().unwrap().values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(limit as usize);
        Ok(JobPage {
            jobs,
            next_cursor: None,
        })
    }

    async fn increment_play_count(&self, _id: &JobId) -> Result<(), JobStoreError> {
        Ok(())
    }
}

struct InstantRunner;

#[async_trait]
impl PipelineRunner for InstantRunner {
    async fn run(
        &self,
        _job_id: &JobId,
        _spec: &EpisodeSpec,
        _cancel: &CancellationToken,
        _observer: &dyn RunObserver,
    ) -> Result<RunOutcome, PipelineError> {
        Ok(RunOutcome {
            output_base: "ep".into(),
            script_path: PathBuf::from("scripts/ep.json"),
            title: "Episode".into(),
            summary: "Summary".into(),
            segment_count: 2,
            episode: None,
        })
    }
}

fn registry() -> (ToolRegistry, Arc<TaskManager>) {
    let store = Arc::new(MemoryStore::default());
    let tasks = Arc::new(TaskManager::new(
        Arc::new(InstantRunner),
        store.clone(),
        CancellationToken::new(),
        5,
    ));
    let service = Arc::new(PodcastService::new(tasks.clone(), store));
    (ToolRegistry::new(service), tasks)
}

#[tokio::test]
async fn generate_then_get_roundtrip() {
    let (registry, tasks) = registry();
    let context = CallContext {
        owner: "tester".into(),
        trace_id: Some("trace-1".into()),
    };

    let result = registry
        .call(
            "generate_podcast",
            json!({ "input_text": "words", "duration": "short", "voices": 2 }),
            &context,
        )
        .await
        .unwrap();
    assert_eq!(result["status"], "submitted");
    let id = result["podcast_id"].as_str().unwrap().to_string();
    assert!(id.starts_with("pc_"));

    tasks.wait_idle().await;

    let status = registry
        .call("get_podcast", json!({ "podcast_id": id }), &context)
        .await
        .unwrap();
    assert_eq!(status["status"], "completed");
    assert_eq!(status["progress_percent"], 100);
    assert_eq!(status["title"], "Episode");
}

#[tokio::test]
async fn get_unknown_podcast_is_not_found() {
    let (registry, _tasks) = registry();
    let err = registry
        .call(
            "get_podcast",
            json!({ "podcast_id": "pc_missing" }),
            &CallContext::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn generate_requires_exactly_one_input() {
    let (registry, _tasks) = registry();
    let err = registry
        .call("generate_podcast", json!({}), &CallContext::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidParams(_)));

    let err = registry
        .call(
            "generate_podcast",
            json!({ "input_text": "a", "input_url": "https://example.com" }),
            &CallContext::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidParams(_)));
}

#[tokio::test]
async fn list_podcasts_counts_items() {
    let (registry, tasks) = registry();
    let context = CallContext::default();

    for _ in 0..3 {
        registry
            .call(
                "generate_podcast",
                json!({ "input_text": "words" }),
                &context,
            )
            .await
            .unwrap();
    }
    tasks.wait_idle().await;

    let listing = registry
        .call("list_podcasts", json!({ "limit": 2 }), &context)
        .await
        .unwrap();
    assert_eq!(listing["count"], 2);
    assert_eq!(listing["podcasts"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn catalog_tools_answer_without_credentials() {
    let (registry, _tasks) = registry();
    let context = CallContext::default();

    let voices = registry
        .call("list_voices", json!({ "provider": "gemini" }), &context)
        .await
        .unwrap();
    assert!(voices["voices"].as_array().unwrap().len() >= 3);

    let options = registry
        .call("list_options", json!({}), &context)
        .await
        .unwrap();
    assert!(options["formats"]
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f == "deep-dive"));
    assert_eq!(options["tts"].as_array().unwrap().len(), 5);

    let info = registry.call("server_info", json!({}), &context).await.unwrap();
    assert_eq!(info["max_tasks"], 5);
    assert_eq!(info["running_tasks"], 0);

    let err = registry
        .call("resolve_entities", json!({}), &context)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UnknownTool(_)));
}
