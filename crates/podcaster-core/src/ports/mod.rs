//! Port traits: the seams between the core and its adapters.

pub mod artifact_sink;
pub mod job_store;
pub mod progress;
pub mod script_model;
pub mod speech;

pub use artifact_sink::{content_type_for, ArtifactSink, SinkError};
pub use job_store::{JobPage, JobStore, JobStoreError};
pub use progress::{
    tts_percent, ProgressEvent, PERCENT_ASSEMBLY_DONE, PERCENT_INGEST_DONE, PERCENT_SCRIPT_DONE,
    PERCENT_UPLOAD_DONE,
};
pub use script_model::{ChatRequest, ScriptModel, ScriptModelError};
pub use speech::{
    AudioFormat, AudioResult, BatchSynthesizer, ProviderLimits, SpeechError, SpeechProvider,
};
