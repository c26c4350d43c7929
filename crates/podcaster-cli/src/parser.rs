//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Turn articles, PDFs and text files into multi-voice podcast episodes.
#[derive(Parser, Debug)]
#[command(name = "podcaster", version, about)]
pub struct Cli {
    /// Output root directory (default: ./podcaster-output).
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate an episode from a URL, PDF or text file.
    Generate(GenerateArgs),
    /// Re-run synthesis and assembly from a persisted script.
    Resume(ResumeArgs),
    /// Inspect stored generation jobs.
    Jobs {
        #[command(subcommand)]
        command: JobsCommand,
    },
    /// List selectable voices for a TTS provider.
    Voices {
        /// Provider tag (gemini, elevenlabs, openai, googletts, vertex).
        provider: String,
    },
    /// Show accepted formats, styles, providers and presets.
    Options,
    /// Check that external dependencies (ffmpeg/ffprobe) are installed.
    Doctor,
}

/// Arguments shared by generation runs.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Source: URL, path to a PDF, or path to a text file.
    #[arg(required_unless_present = "text")]
    pub source: Option<String>,

    /// Inline source text instead of a URL/file.
    #[arg(long, conflicts_with = "source")]
    pub text: Option<String>,

    /// Optional topic focus for the script.
    #[arg(long)]
    pub topic: Option<String>,

    /// Tone: casual, technical or educational.
    #[arg(long, default_value = "casual")]
    pub tone: String,

    /// Duration preset: short, standard, long or deep.
    #[arg(long, default_value = "standard")]
    pub duration: String,

    /// Style flags (repeatable): humor, wow, serious, debate, storytelling.
    #[arg(long = "style")]
    pub styles: Vec<String>,

    /// Episode format (conversation, interview, deep-dive, ...).
    #[arg(long, default_value = "conversation")]
    pub format: String,

    /// Number of hosts (1-3).
    #[arg(long, default_value_t = 2)]
    pub voices: u8,

    /// Language model for script generation.
    #[arg(long, default_value = podcaster_mcp::DEFAULT_MODEL)]
    pub model: String,

    /// TTS provider tag.
    #[arg(long, default_value = "gemini")]
    pub tts: String,

    /// Voice override for host 1 (`voice-id` or `provider:voice-id`).
    #[arg(long)]
    pub voice1: Option<String>,

    /// Voice override for host 2.
    #[arg(long)]
    pub voice2: Option<String>,

    /// Voice override for host 3.
    #[arg(long)]
    pub voice3: Option<String>,

    /// Stop after generating and persisting the script.
    #[arg(long)]
    pub script_only: bool,

    /// Never use the batch synthesis path.
    #[arg(long)]
    pub no_batch: bool,
}

/// Arguments for `resume`.
#[derive(Args, Debug)]
pub struct ResumeArgs {
    /// Path to a previously persisted script JSON.
    pub script: PathBuf,

    /// TTS provider tag.
    #[arg(long, default_value = "gemini")]
    pub tts: String,

    /// Number of hosts (1-3); must match the script's roster.
    #[arg(long, default_value_t = 2)]
    pub voices: u8,

    /// Voice override for host 1.
    #[arg(long)]
    pub voice1: Option<String>,

    /// Voice override for host 2.
    #[arg(long)]
    pub voice2: Option<String>,

    /// Voice override for host 3.
    #[arg(long)]
    pub voice3: Option<String>,

    /// Never use the batch synthesis path.
    #[arg(long)]
    pub no_batch: bool,
}

/// `jobs` subcommands.
#[derive(Subcommand, Debug)]
pub enum JobsCommand {
    /// List jobs, newest first.
    List {
        /// Page size.
        #[arg(long, default_value_t = 20)]
        limit: u32,
        /// Cursor from a previous page.
        #[arg(long)]
        cursor: Option<String>,
    },
    /// Show one job in full.
    Get {
        /// The podcast job id.
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_parses_with_source() {
        let cli = Cli::try_parse_from([
            "podcaster",
            "generate",
            "https://example.com/article",
            "--duration",
            "short",
            "--style",
            "humor",
            "--style",
            "wow",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.source.as_deref(), Some("https://example.com/article"));
                assert_eq!(args.styles, vec!["humor", "wow"]);
                assert_eq!(args.duration, "short");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn generate_requires_some_input() {
        assert!(Cli::try_parse_from(["podcaster", "generate"]).is_err());
        assert!(Cli::try_parse_from(["podcaster", "generate", "--text", "words"]).is_ok());
    }

    #[test]
    fn source_and_text_conflict() {
        assert!(Cli::try_parse_from([
            "podcaster",
            "generate",
            "file.txt",
            "--text",
            "words"
        ])
        .is_err());
    }

    #[test]
    fn resume_takes_a_script_path() {
        let cli = Cli::try_parse_from(["podcaster", "resume", "scripts/ep.json"]).unwrap();
        match cli.command {
            Commands::Resume(args) => assert_eq!(args.script, PathBuf::from("scripts/ep.json")),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
