//! Per-job log file.
//!
//! Stage lines go to tracing (stderr) as usual; the orchestrator also
//! appends them to `logs/<job>.log` so a single job's history survives in
//! one place for the operator.

use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use tracing::warn;

/// Append-only per-job log writer.
pub struct JobLog {
    file: Mutex<File>,
}

impl JobLog {
    /// Open (or create) the log file, appending to an existing one.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Append one stage line. Write failures are logged, never propagated;
    /// the job log is best-effort.
    pub fn line(&self, stage: &str, message: &str, elapsed: Duration) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let line = format!(
            "{timestamp} [{stage}] {message} (elapsed {:.1}s)\n",
            elapsed.as_secs_f64()
        );
        let mut file = match self.file.lock() {
            Ok(file) => file,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = file.write_all(line.as_bytes()) {
            warn!(error = %e, "failed to append to job log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_appended_with_stage_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/job.log");

        let log = JobLog::open(&path).unwrap();
        log.line("ingest", "fetched 1200 words", Duration::from_millis(2500));
        log.line("script", "12 segments", Duration::from_secs(40));
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[ingest] fetched 1200 words (elapsed 2.5s)"));
        assert!(lines[1].contains("[script] 12 segments (elapsed 40.0s)"));
    }
}
