//! ffmpeg/ffprobe invocation plumbing.
//!
//! All audio work shells out to the external tools; this module owns
//! process spawning, error mapping and the dependency check with its
//! remediation hint.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Name of the encoder/concat binary, resolved via `PATH`.
pub const FFMPEG: &str = "ffmpeg";

/// Name of the probe binary, resolved via `PATH`.
pub const FFPROBE: &str = "ffprobe";

/// How many trailing stderr bytes to keep in error messages.
const STDERR_TAIL: usize = 600;

/// Errors from external audio tool invocations.
#[derive(Debug, Error)]
pub enum AudioToolError {
    /// The binary is not installed or not on `PATH`.
    #[error(
        "{program} not found. Install ffmpeg (e.g. `apt install ffmpeg` on Linux, \
         `brew install ffmpeg` on macOS) and make sure it is on PATH"
    )]
    Missing {
        /// Which binary was missing.
        program: &'static str,
    },

    /// The tool ran but exited non-zero.
    #[error("{program} exited with {status}: {stderr_tail}")]
    CommandFailed {
        /// Which binary failed.
        program: &'static str,
        /// Exit status description.
        status: String,
        /// Trailing stderr output.
        stderr_tail: String,
    },

    /// Spawning or waiting on the process failed.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Which binary failed to run.
        program: &'static str,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The tool claimed success but the expected output is missing or empty.
    #[error("{program} produced no output at {path}")]
    EmptyOutput {
        /// Which binary was run.
        program: &'static str,
        /// Expected output path.
        path: String,
    },

    /// Assembly was asked to concatenate zero segments.
    #[error("nothing to assemble: no input segments")]
    NoInput,

    /// Workspace file I/O around a tool invocation failed.
    #[error("audio workspace I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Probe output could not be parsed.
    #[error("could not parse {program} output: {message}")]
    BadProbeOutput {
        /// Which binary was run.
        program: &'static str,
        /// What was wrong.
        message: String,
    },
}

/// Run a tool to completion, capturing output.
///
/// Returns captured stdout on success; maps a non-zero exit to
/// [`AudioToolError::CommandFailed`] with the stderr tail.
pub(crate) async fn run_tool<I, S>(program: &'static str, args: I) -> Result<String, AudioToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!(program, "running external audio tool");

    let output = cmd.output().await.map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            AudioToolError::Missing { program }
        } else {
            AudioToolError::Spawn { program, source }
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail_start = stderr.len().saturating_sub(STDERR_TAIL);
        return Err(AudioToolError::CommandFailed {
            program,
            status: output.status.to_string(),
            stderr_tail: stderr[tail_start..].trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Verify that an output file exists and is non-empty.
pub(crate) fn verify_output(program: &'static str, path: &Path) -> Result<u64, AudioToolError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Ok(meta.len()),
        _ => Err(AudioToolError::EmptyOutput {
            program,
            path: path.display().to_string(),
        }),
    }
}

/// Check that both ffmpeg and ffprobe are available.
///
/// Called once at startup (and by `doctor`); the error message carries the
/// install hint.
pub async fn check_available() -> Result<(), AudioToolError> {
    run_tool(FFMPEG, ["-version"]).await?;
    run_tool(FFPROBE, ["-version"]).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_maps_to_missing_error() {
        let err = run_tool("definitely-not-an-audio-tool", ["-version"])
            .await
            .unwrap_err();
        // run_tool hard-codes the program tag; for an unknown binary the
        // NotFound branch must be taken.
        assert!(matches!(
            err,
            AudioToolError::Missing { .. } | AudioToolError::Spawn { .. }
        ));
    }

    #[test]
    fn verify_output_rejects_missing_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("none.mp3");
        assert!(verify_output(FFMPEG, &missing).is_err());

        let empty = dir.path().join("empty.mp3");
        std::fs::write(&empty, b"").unwrap();
        assert!(verify_output(FFMPEG, &empty).is_err());

        let ok = dir.path().join("ok.mp3");
        std::fs::write(&ok, b"data").unwrap();
        assert_eq!(verify_output(FFMPEG, &ok).unwrap(), 4);
    }
}
