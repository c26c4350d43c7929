//! Episode assembly: silence insertion and concatenation.

use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::convert::MP3_ENCODE_ARGS;
use crate::ffmpeg::{run_tool, verify_output, AudioToolError, FFMPEG};

/// Gap inserted between consecutive segments, in seconds.
const SILENCE_SECS: &str = "0.2";

/// File name of the shared silence clip inside the scratch dir.
const SILENCE_FILE: &str = "silence.mp3";

/// File name of the concat list inside the scratch dir.
const LIST_FILE: &str = "concat.txt";

/// Generate the 200 ms silence clip at 44.1 kHz stereo.
async fn write_silence(path: &Path) -> Result<(), AudioToolError> {
    let args: Vec<OsString> = vec![
        "-y".into(),
        "-hide_banner".into(),
        "-f".into(),
        "lavfi".into(),
        "-i".into(),
        "anullsrc=r=44100:cl=stereo".into(),
        "-t".into(),
        SILENCE_SECS.into(),
        "-c:a".into(),
        "libmp3lame".into(),
        "-b:a".into(),
        "192k".into(),
        path.into(),
    ];
    run_tool(FFMPEG, args).await?;
    verify_output(FFMPEG, path)?;
    Ok(())
}

/// Render the concat list: segments alternating with silence, omitting the
/// trailing silence entry.
fn concat_list(segments: &[PathBuf], silence: &Path) -> String {
    let mut list = String::new();
    for (i, segment) in segments.iter().enumerate() {
        let _ = writeln!(list, "file '{}'", segment.display());
        if i + 1 < segments.len() {
            let _ = writeln!(list, "file '{}'", silence.display());
        }
    }
    list
}

/// Build the concat invocation.
fn concat_args(list: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-y".into(),
        "-hide_banner".into(),
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        list.into(),
    ];
    args.extend(MP3_ENCODE_ARGS.iter().map(OsString::from));
    args.push(output.into());
    args
}

/// Concatenate ordered segment MP3s into the final episode.
///
/// Writes a silence clip and concat list into `scratch`, re-encodes with the
/// unified output parameters and verifies the result is non-empty. Returns
/// the output file size in bytes.
pub async fn assemble(
    segments: &[PathBuf],
    scratch: &Path,
    output: &Path,
) -> Result<u64, AudioToolError> {
    if segments.is_empty() {
        return Err(AudioToolError::NoInput);
    }

    let silence = scratch.join(SILENCE_FILE);
    write_silence(&silence).await?;

    let list_path = scratch.join(LIST_FILE);
    tokio::fs::write(&list_path, concat_list(segments, &silence)).await?;

    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    run_tool(FFMPEG, concat_args(&list_path, output)).await?;
    let size = verify_output(FFMPEG, output)?;

    info!(
        segments = segments.len(),
        output = %output.display(),
        size_bytes = size,
        "assembled episode"
    );
    Ok(size)
}
