//! Pipeline orchestration: ingest → script → TTS → assembly → upload.
//!
//! The orchestrator owns the scratch-directory lifecycle. Scratch dirs are
//! deleted on success and retained on failure; the persisted script under
//! `scripts/` is written before TTS starts, which is what makes
//! `from-script` re-runs cheap.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use podcaster_audio::{assemble, duration_secs};
use podcaster_core::{
    slugify, tts_percent, ArtifactSink, EpisodeSpec, JobId, OutputLayout, PipelineError,
    ProgressEvent, Script, Stage, StageError, Voice, VoiceMap, MIN_CONTENT_WORDS,
    PERCENT_ASSEMBLY_DONE, PERCENT_INGEST_DONE, PERCENT_SCRIPT_DONE, PERCENT_UPLOAD_DONE,
};
use podcaster_ingest::{ingest_inline, Ingester};
use podcaster_script::{GenerateError, ScriptGenerator};
use podcaster_tts::{DispatchError, Dispatcher, ProviderLookup};

use crate::joblog::JobLog;
use crate::observer::RunObserver;

/// Published artifact details for a completed run.
#[derive(Clone, Debug)]
pub struct EpisodeArtifact {
    /// Local path of the final MP3.
    pub path: PathBuf,
    /// Public URL returned by the sink.
    pub url: String,
    /// Probed duration in seconds.
    pub duration_secs: f64,
    /// File size in bytes.
    pub file_size_bytes: u64,
}

/// Result of a successful pipeline run.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    /// Output basename used for episode/script files.
    pub output_base: String,
    /// Where the script JSON was persisted.
    pub script_path: PathBuf,
    /// Episode title.
    pub title: String,
    /// Episode summary.
    pub summary: String,
    /// Segment count of the script.
    pub segment_count: usize,
    /// `None` for script-only runs.
    pub episode: Option<EpisodeArtifact>,
}

/// The stage sequencer.
pub struct Orchestrator {
    layout: OutputLayout,
    ingester: Arc<Ingester>,
    generator: Arc<ScriptGenerator>,
    providers: Arc<dyn ProviderLookup>,
    sink: Arc<dyn ArtifactSink>,
}

/// Progress emission helper shared by the stage code.
struct Emitter<'a> {
    observer: &'a dyn RunObserver,
    joblog: Option<&'a JobLog>,
    started: Instant,
}

impl Emitter<'_> {
    fn emit(&self, stage: Stage, percent: u8, message: impl Into<String>) {
        let message = message.into();
        let elapsed = self.started.elapsed();
        if let Some(log) = self.joblog {
            log.line(stage.as_str(), &message, elapsed);
        }
        info!(stage = %stage, percent, elapsed_ms = elapsed.as_millis() as u64, "{message}");
        self.observer.progress(ProgressEvent {
            stage,
            percent,
            message,
            elapsed,
        });
    }
}

impl Orchestrator {
    /// Wire an orchestrator from its collaborators.
    pub fn new(
        layout: OutputLayout,
        ingester: Arc<Ingester>,
        generator: Arc<ScriptGenerator>,
        providers: Arc<dyn ProviderLookup>,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        Self {
            layout,
            ingester,
            generator,
            providers,
            sink,
        }
    }

    /// Run the pipeline for one job.
    pub async fn run(
        &self,
        job_id: &JobId,
        spec: &EpisodeSpec,
        cancel: &CancellationToken,
        observer: &dyn RunObserver,
    ) -> Result<RunOutcome, PipelineError> {
        self.layout
            .ensure()
            .map_err(|e| StageError::new(Stage::Ingest, e))?;

        let scratch = self.layout.scratch_dir(job_id.suffix());
        tokio::fs::create_dir_all(&scratch)
            .await
            .map_err(|e| StageError::new(Stage::Ingest, e))?;

        let joblog = JobLog::open(&self.layout.log_path(job_id.as_str())).ok();
        let emitter = Emitter {
            observer,
            joblog: joblog.as_ref(),
            started: Instant::now(),
        };

        let result = self
            .run_stages(job_id, spec, cancel, &emitter, &scratch)
            .await;

        match &result {
            Ok(_) => {
                // Success: the scratch dir has served its purpose.
                if let Err(e) = tokio::fs::remove_dir_all(&scratch).await {
                    info!(scratch = %scratch.display(), error = %e, "could not remove scratch dir");
                }
            }
            Err(e) => {
                // Retention policy: never delete scratch after a failure.
                error!(
                    job_id = %job_id,
                    error = %e,
                    scratch = %scratch.display(),
                    "pipeline failed; scratch dir retained for inspection"
                );
                if let Some(log) = joblog.as_ref() {
                    log.line(
                        "failed",
                        &format!("{e}; artifacts retained under {}", scratch.display()),
                        emitter.started.elapsed(),
                    );
                }
            }
        }

        result
    }

    async fn run_stages(
        &self,
        job_id: &JobId,
        spec: &EpisodeSpec,
        cancel: &CancellationToken,
        emitter: &Emitter<'_>,
        scratch: &Path,
    ) -> Result<RunOutcome, PipelineError> {
        ensure_live(cancel)?;

        // Stages 1+2, or a cheap script reload.
        let (script, output_base) = if let Some(ref from) = spec.from_script {
            let script = Script::load(Path::new(from))
                .await
                .map_err(|e| StageError::new(Stage::Script, e))?;
            let base = Path::new(from)
                .file_stem()
                .and_then(|s| s.to_str())
                .map_or_else(
                    || format!("{}-{}", slugify(&script.title), job_id.suffix()),
                    str::to_string,
                );
            emitter.emit(
                Stage::Script,
                PERCENT_SCRIPT_DONE,
                format!("loaded existing script from {from}"),
            );
            (script, base)
        } else {
            let content = self.ingest(spec).await?;
            emitter.emit(
                Stage::Ingest,
                PERCENT_INGEST_DONE,
                format!("ingested {} words from {}", content.word_count, content.source),
            );
            ensure_live(cancel)?;

            let script = self
                .generator
                .generate(&content, spec, spec.llm_api_key.as_deref(), cancel)
                .await
                .map_err(|e| match e {
                    GenerateError::Canceled => PipelineError::Canceled,
                    other => StageError::new(Stage::Script, other).into(),
                })?;
            let base = format!("{}-{}", slugify(&script.title), job_id.suffix());
            (script, base)
        };

        // Persist the script before TTS, unconditionally.
        let script_path = self.layout.script_path(&output_base);
        script
            .save(&script_path)
            .await
            .map_err(|e| StageError::new(Stage::Script, e))?;
        emitter.observer.script_ready(&script.title, &script.summary);
        emitter.emit(
            Stage::Script,
            PERCENT_SCRIPT_DONE,
            format!(
                "script ready: {} segments, ~{} min, saved to {}",
                script.segments.len(),
                script.estimated_minutes(),
                script_path.display()
            ),
        );

        if spec.script_only {
            return Ok(RunOutcome {
                output_base,
                script_path,
                title: script.title.clone(),
                summary: script.summary.clone(),
                segment_count: script.segments.len(),
                episode: None,
            });
        }

        ensure_live(cancel)?;

        // Stage 3: synthesis.
        let voices = self.build_voice_map(spec).await?;
        let dispatcher = Dispatcher::new(Arc::clone(&self.providers));
        let total = script.segments.len();
        let segments = dispatcher
            .synthesize(
                &script,
                &voices,
                scratch,
                spec.disable_batch,
                cancel,
                |done, _total| {
                    emitter.emit(
                        Stage::Tts,
                        tts_percent(done, total),
                        format!("synthesized segment {done}/{total}"),
                    );
                },
            )
            .await
            .map_err(|e| match e {
                DispatchError::Canceled => PipelineError::Canceled,
                other => StageError::new(Stage::Tts, other).into(),
            })?;

        ensure_live(cancel)?;

        // Stage 4: assembly.
        let episode_path = self.layout.episode_path(&output_base);
        let file_size_bytes = assemble(&segments, scratch, &episode_path)
            .await
            .map_err(|e| StageError::new(Stage::Assembly, e))?;
        let duration = duration_secs(&episode_path)
            .await
            .map_err(|e| StageError::new(Stage::Assembly, e))?;
        emitter.emit(
            Stage::Assembly,
            PERCENT_ASSEMBLY_DONE,
            format!("assembled {duration:.1}s episode"),
        );

        ensure_live(cancel)?;

        // Publication.
        let key = format!("episodes/{output_base}.mp3");
        let url = self
            .sink
            .upload(&episode_path, &key)
            .await
            .map_err(|e| StageError::new(Stage::Upload, e))?;
        emitter.emit(Stage::Upload, PERCENT_UPLOAD_DONE, format!("published {url}"));

        Ok(RunOutcome {
            output_base,
            script_path,
            title: script.title.clone(),
            summary: script.summary.clone(),
            segment_count: total,
            episode: Some(EpisodeArtifact {
                path: episode_path,
                url,
                duration_secs: duration,
                file_size_bytes,
            }),
        })
    }

    async fn ingest(&self, spec: &EpisodeSpec) -> Result<podcaster_core::Content, PipelineError> {
        let content = if let Some(ref text) = spec.input_text {
            ingest_inline(text, "inline text").map_err(|e| StageError::new(Stage::Ingest, e))?
        } else if let Some(ref source) = spec.source {
            self.ingester
                .ingest(source)
                .await
                .map_err(|e| StageError::new(Stage::Ingest, e))?
        } else {
            return Err(StageError::new(Stage::Ingest, "no input source provided").into());
        };

        if !content.is_long_enough() {
            return Err(StageError::new(
                Stage::Ingest,
                format!(
                    "content too short: {} words (minimum {MIN_CONTENT_WORDS})",
                    content.word_count
                ),
            )
            .into());
        }
        Ok(content)
    }

    /// Build the voice map: overrides first, provider defaults for the rest.
    async fn build_voice_map(&self, spec: &EpisodeSpec) -> Result<VoiceMap, PipelineError> {
        let provider = self
            .providers
            .get(spec.tts)
            .await
            .map_err(|e| StageError::new(Stage::Tts, e))?;
        let defaults = provider.default_voices();

        let mut slots = Vec::with_capacity(spec.voice_count());
        for i in 0..spec.voice_count() {
            let voice = match spec.voice_overrides[i] {
                Some(ref raw) => parse_voice_override(raw, spec),
                None => defaults
                    .slot(i)
                    .cloned()
                    .ok_or_else(|| StageError::new(Stage::Tts, "provider has no default voice"))?,
            };
            slots.push(voice);
        }

        VoiceMap::new(slots)
            .ok_or_else(|| StageError::new(Stage::Tts, "no active voices").into())
    }
}

/// Parse a per-slot voice override: either `<voice-id>` (the run's provider)
/// or `<provider>:<voice-id>` for mixed-provider rosters.
fn parse_voice_override(raw: &str, spec: &EpisodeSpec) -> Voice {
    match raw.split_once(':') {
        Some((provider, id)) => match provider.parse() {
            Ok(kind) => Voice::new(id, id, kind),
            Err(_) => Voice::new(raw, raw, spec.tts),
        },
        None => Voice::new(raw, raw, spec.tts),
    }
}

fn ensure_live(cancel: &CancellationToken) -> Result<(), PipelineError> {
    if cancel.is_cancelled() {
        Err(PipelineError::Canceled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use podcaster_core::{
        DurationPreset, EpisodeFormat, ProviderKind, Segment, SinkError, SpeechError,
        SpeechProvider, Tone,
    };
    use podcaster_script::HttpChatBackend;

    use crate::observer::NoopObserver;

    struct NoProviders;

    #[async_trait]
    impl ProviderLookup for NoProviders {
        async fn get(
            &self,
            kind: ProviderKind,
        ) -> Result<Arc<dyn SpeechProvider>, SpeechError> {
            Err(SpeechError::Auth {
                provider: kind,
                message: "no credentials in tests".into(),
            })
        }
    }

    struct NoSink;

    #[async_trait]
    impl ArtifactSink for NoSink {
        async fn upload(&self, _local_path: &Path, key: &str) -> Result<String, SinkError> {
            Err(SinkError::UploadFailed {
                key: key.to_string(),
                message: "unreachable in tests".into(),
            })
        }
    }

    fn orchestrator(root: &Path) -> Orchestrator {
        let backend = Arc::new(HttpChatBackend::new("http://127.0.0.1:1", None));
        Orchestrator::new(
            OutputLayout::new(root),
            Arc::new(Ingester::new()),
            Arc::new(ScriptGenerator::new(backend)),
            Arc::new(NoProviders),
            Arc::new(NoSink),
        )
    }

    fn spec_from_script(path: &Path, script_only: bool) -> EpisodeSpec {
        EpisodeSpec {
            source: None,
            input_text: None,
            from_script: Some(path.display().to_string()),
            script_only,
            topic: None,
            tone: Tone::Casual,
            duration: DurationPreset::Short,
            styles: vec![],
            format: EpisodeFormat::Conversation,
            voices: 2,
            model: "test-model".into(),
            tts: ProviderKind::Gemini,
            voice_overrides: [None, None, None],
            disable_batch: false,
            llm_api_key: None,
        }
    }

    fn sample_script() -> Script {
        Script {
            title: "Rivers Revisited".into(),
            summary: "S".into(),
            segments: vec![
                Segment::new("Maya", "Hello."),
                Segment::new("Theo", "Hi."),
            ],
        }
    }

    #[tokio::test]
    async fn script_only_from_script_persists_a_fixed_point() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator(dir.path());

        // Seed a script file outside the layout.
        let seed = dir.path().join("seed.json");
        sample_script().save(&seed).await.unwrap();

        let job = JobId::generate();
        let outcome = orchestrator
            .run(
                &job,
                &spec_from_script(&seed, true),
                &CancellationToken::new(),
                &NoopObserver,
            )
            .await
            .unwrap();

        assert_eq!(outcome.output_base, "seed");
        assert!(outcome.episode.is_none());
        assert_eq!(outcome.segment_count, 2);

        // The persisted copy equals the source: load → save is a fixed point.
        let persisted = Script::load(&outcome.script_path).await.unwrap();
        assert_eq!(persisted, sample_script());

        // Success path removed the scratch dir.
        assert!(!dir
            .path()
            .join(format!("tempfiles/run-{}", job.suffix()))
            .exists());
    }

    #[tokio::test]
    async fn tts_failure_retains_scratch_and_script() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator(dir.path());

        let seed = dir.path().join("seed.json");
        sample_script().save(&seed).await.unwrap();

        let job = JobId::generate();
        let err = orchestrator
            .run(
                &job,
                &spec_from_script(&seed, false),
                &CancellationToken::new(),
                &NoopObserver,
            )
            .await
            .unwrap_err();

        // Provider lookup fails -> tts stage failure.
        assert_eq!(err.stage(), Some(Stage::Tts));

        // Retention policy: scratch dir and persisted script both remain.
        assert!(dir
            .path()
            .join(format!("tempfiles/run-{}", job.suffix()))
            .exists());
        assert!(dir.path().join("scripts/seed.json").exists());
    }

    #[tokio::test]
    async fn missing_input_is_an_ingest_failure() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator(dir.path());

        let mut spec = spec_from_script(Path::new("unused"), false);
        spec.from_script = None;

        let err = orchestrator
            .run(
                &JobId::generate(),
                &spec,
                &CancellationToken::new(),
                &NoopObserver,
            )
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Ingest));
    }

    #[tokio::test]
    async fn short_content_is_rejected_after_ingest() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator(dir.path());

        let mut spec = spec_from_script(Path::new("unused"), false);
        spec.from_script = None;
        spec.input_text = Some("only a few words here".into());

        let err = orchestrator
            .run(
                &JobId::generate(),
                &spec,
                &CancellationToken::new(),
                &NoopObserver,
            )
            .await
            .unwrap_err();
        match err {
            PipelineError::Stage(stage_err) => {
                assert_eq!(stage_err.stage, Stage::Ingest);
                assert!(stage_err.message.contains("too short"));
            }
            PipelineError::Canceled => panic!("unexpected cancel"),
        }
    }

    #[tokio::test]
    async fn cancellation_before_start_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator(dir.path());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let seed = dir.path().join("seed.json");
        sample_script().save(&seed).await.unwrap();

        let err = orchestrator
            .run(
                &JobId::generate(),
                &spec_from_script(&seed, true),
                &cancel,
                &NoopObserver,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Canceled));
    }

    #[test]
    fn voice_override_parsing() {
        let spec = spec_from_script(Path::new("x"), false);
        let plain = parse_voice_override("Kore", &spec);
        assert_eq!(plain.provider, ProviderKind::Gemini);
        assert_eq!(plain.id, "Kore");

        let tagged = parse_voice_override("openai:nova", &spec);
        assert_eq!(tagged.provider, ProviderKind::Openai);
        assert_eq!(tagged.id, "nova");

        // Voice ids containing colons with an unknown prefix stay whole.
        let odd = parse_voice_override("weird:id", &spec);
        assert_eq!(odd.provider, ProviderKind::Gemini);
        assert_eq!(odd.id, "weird:id");
    }
}
