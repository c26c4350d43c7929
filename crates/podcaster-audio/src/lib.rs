//! External audio tool adapter.
//!
//! Wraps the ffmpeg/ffprobe command contracts used by the pipeline:
//! silence generation, segment format conversion, concat re-encoding and
//! the duration probe. Every invocation is a child process; the OS is the
//! concurrency arbiter.

mod assemble;
mod convert;
mod ffmpeg;
mod probe;

pub use assemble::assemble;
pub use convert::convert_to_mp3;
pub use ffmpeg::{check_available, AudioToolError, FFMPEG, FFPROBE};
pub use probe::duration_secs;
