//! Command handlers.

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use podcaster_audio::check_available;
use podcaster_core::{EpisodeSpec, JobId, PipelineError, ProgressEvent, ProviderKind};
use podcaster_pipeline::RunObserver;
use podcaster_tts::voice_catalog;

use crate::bootstrap::CliContext;
use crate::parser::{GenerateArgs, JobsCommand, ResumeArgs};

/// Observer that drives an interactive progress bar.
struct BarObserver {
    bar: ProgressBar,
}

impl BarObserver {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("{bar:30.cyan/dim} {pos:>3}% {msg}")
                .expect("static template is valid"),
        );
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl RunObserver for BarObserver {
    fn progress(&self, event: ProgressEvent) {
        self.bar.set_position(u64::from(event.percent));
        self.bar.set_message(event.message);
    }
}

fn build_spec(args: GenerateArgs) -> Result<EpisodeSpec> {
    Ok(EpisodeSpec {
        source: args.source,
        input_text: args.text,
        from_script: None,
        script_only: args.script_only,
        topic: args.topic,
        tone: args.tone.parse().map_err(anyhow::Error::msg)?,
        duration: args.duration.parse().map_err(anyhow::Error::msg)?,
        styles: args
            .styles
            .iter()
            .map(|s| s.parse().map_err(anyhow::Error::msg))
            .collect::<Result<Vec<_>>>()?,
        format: args.format.parse().map_err(anyhow::Error::msg)?,
        voices: args.voices,
        model: args.model,
        tts: args.tts.parse().map_err(anyhow::Error::msg)?,
        voice_overrides: [args.voice1, args.voice2, args.voice3],
        disable_batch: args.no_batch,
        llm_api_key: None,
    })
}

async fn run_pipeline(
    context: &CliContext,
    spec: EpisodeSpec,
    cancel: &CancellationToken,
) -> Result<()> {
    let job_id = JobId::generate();
    let observer = BarObserver::new();

    let result = context
        .orchestrator
        .run(&job_id, &spec, cancel, &observer)
        .await;
    observer.finish();
    context.providers.close().await;

    match result {
        Ok(outcome) => {
            println!("Title:   {}", outcome.title);
            println!("Summary: {}", outcome.summary);
            println!("Script:  {}", outcome.script_path.display());
            if let Some(episode) = outcome.episode {
                println!("Episode: {}", episode.path.display());
                println!(
                    "         {:.1} min, {:.2} MB",
                    episode.duration_secs / 60.0,
                    episode.file_size_bytes as f64 / (1024.0 * 1024.0)
                );
                println!("URL:     {}", episode.url);
            }
            Ok(())
        }
        Err(PipelineError::Canceled) => bail!("generation canceled"),
        Err(e) => bail!("{e}"),
    }
}

/// `podcaster generate ...`
pub async fn handle_generate(
    context: &CliContext,
    args: GenerateArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    let spec = build_spec(args)?;
    run_pipeline(context, spec, cancel).await
}

/// `podcaster resume <script> ...`
pub async fn handle_resume(
    context: &CliContext,
    args: ResumeArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    let spec = EpisodeSpec {
        source: None,
        input_text: None,
        from_script: Some(args.script.display().to_string()),
        script_only: false,
        topic: None,
        tone: podcaster_core::Tone::default(),
        duration: podcaster_core::DurationPreset::default(),
        styles: vec![],
        format: podcaster_core::EpisodeFormat::default(),
        voices: args.voices,
        model: podcaster_mcp::DEFAULT_MODEL.to_string(),
        tts: args.tts.parse().map_err(anyhow::Error::msg)?,
        voice_overrides: [args.voice1, args.voice2, args.voice3],
        disable_batch: args.no_batch,
        llm_api_key: None,
    };
    run_pipeline(context, spec, cancel).await
}

/// `podcaster jobs list|get`
pub async fn handle_jobs(context: &CliContext, command: JobsCommand) -> Result<()> {
    match command {
        JobsCommand::List { limit, cursor } => {
            let page = context.store.list(limit, cursor.as_deref()).await?;
            if page.jobs.is_empty() {
                println!("No jobs found.");
                return Ok(());
            }
            for job in &page.jobs {
                println!(
                    "{}  {:<10} {:>3}%  {}  {}",
                    job.id,
                    job.status,
                    job.progress_percent,
                    job.created_at.format("%Y-%m-%d %H:%M"),
                    job.title.as_deref().unwrap_or("-"),
                );
            }
            if let Some(cursor) = page.next_cursor {
                println!("\nNext page: --cursor {cursor}");
            }
            Ok(())
        }
        JobsCommand::Get { id } => {
            let record = context
                .store
                .get(&JobId::from_string(&id))
                .await?
                .ok_or_else(|| anyhow::anyhow!("job '{id}' not found"))?;
            println!("Id:       {}", record.id);
            println!("Status:   {}", record.status);
            println!("Progress: {}% ({})", record.progress_percent, record.stage_message);
            println!("Created:  {}", record.created_at.to_rfc3339());
            println!("Model:    {} / {}", record.config.model, record.config.tts);
            if let Some(ref title) = record.title {
                println!("Title:    {title}");
            }
            if let Some(ref url) = record.audio_url {
                println!("URL:      {url}");
            }
            if let Some(duration) = record.duration_secs {
                println!("Duration: {:.1} min", duration / 60.0);
            }
            if let Some(ref error) = record.error {
                println!("Error:    {error}");
            }
            Ok(())
        }
    }
}

/// `podcaster voices <provider>`
pub fn handle_voices(provider: &str) -> Result<()> {
    let kind: ProviderKind = provider.parse().map_err(anyhow::Error::msg)?;
    println!("Voices for {kind}:");
    for voice in voice_catalog(kind) {
        let default = voice
            .default_for
            .map_or_else(String::new, |slot| format!("  (default host {slot})"));
        println!("  {:<24} {:<10} {}{}", voice.id, voice.gender, voice.description, default);
    }
    Ok(())
}

/// `podcaster options`
pub fn handle_options() -> Result<()> {
    use podcaster_core::{DurationPreset, EpisodeFormat, Style};

    let labels = |items: &[String]| items.join(", ");
    println!(
        "Formats:   {}",
        labels(&EpisodeFormat::ALL.map(|f| f.as_str().to_string()))
    );
    println!(
        "Styles:    {}",
        labels(&Style::ALL.map(|s| s.as_str().to_string()))
    );
    println!(
        "Providers: {}",
        labels(&ProviderKind::ALL.map(|p| p.as_str().to_string()))
    );
    println!(
        "Durations: {}",
        labels(&DurationPreset::ALL.map(|d| d.as_str().to_string()))
    );
    Ok(())
}

/// `podcaster doctor`
pub async fn handle_doctor() -> Result<()> {
    match check_available().await {
        Ok(()) => {
            println!("ffmpeg and ffprobe found. Ready to generate.");
            Ok(())
        }
        Err(e) => bail!("{e}"),
    }
}
