//! CLI bootstrap - the composition root.
//!
//! This is the ONLY place where infrastructure is wired together for the
//! CLI: database pool and job store (podcaster-db), HTTP backends
//! (podcaster-script / podcaster-tts), the artifact sink and the
//! orchestrator. Command handlers receive the composed context and
//! delegate work to it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;

use podcaster_core::{JobStore, OutputLayout};
use podcaster_db::{setup_database, SqliteJobStore};
use podcaster_ingest::Ingester;
use podcaster_mcp::{PodcastService, ToolRegistry};
use podcaster_pipeline::{LocalDirSink, Orchestrator, TaskManager, DEFAULT_MAX_TASKS};
use podcaster_script::{HttpChatBackend, ScriptGenerator, DEFAULT_BASE_URL};
use podcaster_tts::{batch_disabled_from_env, ProviderCredentials, ProviderSet};

/// Fully composed application context for CLI commands.
pub struct CliContext {
    /// Output directory layout.
    pub layout: OutputLayout,
    /// Durable job store.
    pub store: Arc<dyn JobStore>,
    /// The stage sequencer.
    pub orchestrator: Arc<Orchestrator>,
    /// Shared provider pool, for shutdown.
    pub providers: Arc<ProviderSet>,
}

/// Compose the CLI context.
///
/// The language-model base URL and key come from `PODCASTER_LLM_BASE_URL`
/// and `OPENAI_API_KEY`; the CDN base for published URLs from
/// `PODCASTER_CDN_BASE` (default: a `file://` URL under the output root);
/// providers whose batch path should stay off deployment-wide from
/// `PODCASTER_DISABLE_BATCH` (comma-separated tags).
pub async fn bootstrap(output_dir: Option<PathBuf>) -> Result<CliContext> {
    let layout = output_dir.map_or_else(OutputLayout::default_root, OutputLayout::new);
    layout.ensure()?;

    let pool = setup_database(&layout.root().join("podcaster.db")).await?;
    let store: Arc<dyn JobStore> = Arc::new(SqliteJobStore::new(pool));

    let base_url = std::env::var("PODCASTER_LLM_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let api_key = std::env::var("OPENAI_API_KEY").ok();
    let backend = Arc::new(HttpChatBackend::new(base_url, api_key));
    let generator = Arc::new(ScriptGenerator::new(backend));

    // The batch switch is deployment-level: batch endpoints with a daily
    // quota are shared by every job this process runs.
    let providers = Arc::new(
        ProviderSet::new(ProviderCredentials::default())
            .with_batch_disabled(batch_disabled_from_env()),
    );

    let public_dir = layout.root().join("public");
    let cdn_base = std::env::var("PODCASTER_CDN_BASE")
        .unwrap_or_else(|_| format!("file://{}", public_dir.display()));
    let sink = Arc::new(LocalDirSink::new(public_dir, cdn_base));

    let orchestrator = Arc::new(Orchestrator::new(
        layout.clone(),
        Arc::new(Ingester::new()),
        generator,
        providers.clone(),
        sink,
    ));

    Ok(CliContext {
        layout,
        store,
        orchestrator,
        providers,
    })
}

/// Compose the tool-call surface for an embedding RPC transport.
///
/// The transport (session handshake, JSON framing) lives outside this
/// repository; it calls this once at startup and forwards every
/// `tool.call(name, args)` to the returned registry.
pub fn build_tool_registry(context: &CliContext, shutdown: CancellationToken) -> ToolRegistry {
    let tasks = Arc::new(TaskManager::new(
        context.orchestrator.clone(),
        context.store.clone(),
        shutdown,
        DEFAULT_MAX_TASKS,
    ));
    let service = Arc::new(PodcastService::new(tasks, context.store.clone()));
    ToolRegistry::new(service)
}

/// Process-wide shutdown token, cancelled on SIGINT or SIGTERM.
pub fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();

    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling work");
            ctrl_c.cancel();
        }
    });

    #[cfg(unix)]
    {
        let term = token.clone();
        tokio::spawn(async move {
            let mut sigterm = match tokio::signal::unix::signal(
                tokio::signal::unix::SignalKind::terminate(),
            ) {
                Ok(signal) => signal,
                Err(_) => return,
            };
            if sigterm.recv().await.is_some() {
                info!("SIGTERM received, cancelling work");
                term.cancel();
            }
        });
    }

    token
}
