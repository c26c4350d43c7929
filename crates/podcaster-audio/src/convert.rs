//! Per-segment format conversion.
//!
//! Non-MP3 provider output is converted to MP3 with the same parameters
//! the assembler uses, so every segment carries identical codec settings
//! at concat time.

use std::ffi::OsString;
use std::path::Path;

use podcaster_core::AudioFormat;

use crate::ffmpeg::{run_tool, verify_output, AudioToolError, FFMPEG};

/// Unified MP3 encode parameters: 192 kbps, 44.1 kHz stereo, LAME quality 0,
/// high-quality resampler.
pub(crate) const MP3_ENCODE_ARGS: &[&str] = &[
    "-af",
    "aresample=resampler=soxr:precision=28",
    "-c:a",
    "libmp3lame",
    "-b:a",
    "192k",
    "-ar",
    "44100",
    "-ac",
    "2",
    "-compression_level",
    "0",
];

/// Build the ffmpeg argument list for one conversion.
fn convert_args(input: &Path, format: AudioFormat, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-hide_banner".into()];

    match format {
        // Raw PCM needs explicit interpretation parameters.
        AudioFormat::Pcm24k => {
            args.extend(["-f", "s16le", "-ar", "24000", "-ac", "1"].map(OsString::from));
        }
        // WAV carries its own header; ffmpeg auto-detects.
        AudioFormat::Wav | AudioFormat::Mp3 => {}
    }

    args.push("-i".into());
    args.push(input.into());
    args.extend(MP3_ENCODE_ARGS.iter().map(OsString::from));
    args.push(output.into());
    args
}

/// Convert a provider payload file to a concat-ready MP3.
///
/// MP3 input is not re-encoded here; callers write MP3 payloads straight to
/// their final segment path instead of calling this.
pub async fn convert_to_mp3(
    input: &Path,
    format: AudioFormat,
    output: &Path,
) -> Result<(), AudioToolError> {
    run_tool(FFMPEG, convert_args(input, format, output)).await?;
    verify_output(FFMPEG, output)?;
    Ok(())
}
