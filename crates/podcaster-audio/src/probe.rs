//! Duration probe over ffprobe.

use std::path::Path;

use crate::ffmpeg::{run_tool, AudioToolError, FFPROBE};

/// Read `format.duration` of a media file, in seconds.
pub async fn duration_secs(path: &Path) -> Result<f64, AudioToolError> {
    let output = run_tool(
        FFPROBE,
        [
            "-v".as_ref(),
            "error".as_ref(),
            "-show_entries".as_ref(),
            "format=duration".as_ref(),
            "-of".as_ref(),
            "default=noprint_wrappers=1:nokey=1".as_ref(),
            path.as_os_str(),
        ],
    )
    .await?;

    parse_duration(&output)
}

fn parse_duration(raw: &str) -> Result<f64, AudioToolError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| AudioToolError::BadProbeOutput {
            program: FFPROBE,
            message: format!("expected decimal seconds, got '{}'", raw.trim()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_seconds() {
        assert!((parse_duration("247.342041\n").unwrap() - 247.342_041).abs() < 1e-9);
        assert!((parse_duration("0.2").unwrap() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_duration("N/A").is_err());
        assert!(parse_duration("").is_err());
    }
}
