//! Core domain types: pure data with no I/O dependencies.

pub mod content;
pub mod job;
pub mod options;
pub mod persona;
pub mod script;
pub mod voice;

pub use content::{derive_title, Content, MAX_CONTENT_BYTES, MIN_CONTENT_WORDS};
pub use job::{JobConfig, JobId, JobRecord, JobStatus, JobUpdate};
pub use options::{DurationPreset, EpisodeFormat, EpisodeSpec, Style, Tone};
pub use persona::{roster, roster_names, Persona, PERSONAS};
pub use script::{Script, ScriptError, Segment};
pub use voice::{ProviderKind, Voice, VoiceInfo, VoiceMap, MAX_VOICES};
