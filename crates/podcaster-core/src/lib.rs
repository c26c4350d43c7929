//! Core domain types and port definitions for the podcaster pipeline.
//!
//! This crate is dependency-light by design: pure domain types under
//! [`domain`], async port traits under [`ports`], the stage-tagged error
//! taxonomy in [`error`] and the output-directory layout in [`paths`].
//! Adapters (HTTP providers, SQLite store, ffmpeg shell-outs) live in
//! sibling crates and are wired together only at the composition root.

pub mod domain;
pub mod error;
pub mod paths;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    derive_title, roster, roster_names, Content, DurationPreset, EpisodeFormat, EpisodeSpec,
    JobConfig, JobId, JobRecord, JobStatus, JobUpdate, Persona, ProviderKind, Script, ScriptError,
    Segment, Style, Tone, Voice, VoiceInfo, VoiceMap, MAX_CONTENT_BYTES, MAX_VOICES,
    MIN_CONTENT_WORDS, PERSONAS,
};
pub use error::{PipelineError, Stage, StageError};
pub use paths::{slugify, OutputLayout, PathError, DEFAULT_OUTPUT_DIR};
pub use ports::{
    content_type_for, tts_percent, ArtifactSink, AudioFormat, AudioResult, BatchSynthesizer,
    ChatRequest, JobPage, JobStore, JobStoreError, ProgressEvent, ProviderLimits, ScriptModel,
    ScriptModelError, SinkError, SpeechError, SpeechProvider, PERCENT_ASSEMBLY_DONE,
    PERCENT_INGEST_DONE, PERCENT_SCRIPT_DONE, PERCENT_UPLOAD_DONE,
};
