//! Output directory layout.
//!
//! Everything the pipeline writes lives under one root:
//!
//! ```text
//! podcaster-output/
//!   episodes/<name>.mp3       final audio
//!   scripts/<name>.json       always written
//!   logs/<name>.log           per-job log
//!   tempfiles/run-XXXX/       scratch; deleted on success, retained on failure
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default output root directory name, resolved relative to the working dir.
pub const DEFAULT_OUTPUT_DIR: &str = "podcaster-output";

/// Errors from output-path management.
#[derive(Debug, Error)]
pub enum PathError {
    /// A directory could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateFailed {
        /// The directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The root exists but is not writable.
    #[error("output root {path} is not writable: {source}")]
    NotWritable {
        /// The root that failed the write probe.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// The output directory tree for one deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Layout rooted at an explicit directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout rooted at `./podcaster-output`.
    #[must_use]
    pub fn default_root() -> Self {
        Self::new(PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding final episodes.
    #[must_use]
    pub fn episodes_dir(&self) -> PathBuf {
        self.root.join("episodes")
    }

    /// Directory holding persisted scripts.
    #[must_use]
    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join("scripts")
    }

    /// Directory holding per-job logs.
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Parent of all per-job scratch directories.
    #[must_use]
    pub fn temp_root(&self) -> PathBuf {
        self.root.join("tempfiles")
    }

    /// Final MP3 path for an output basename.
    #[must_use]
    pub fn episode_path(&self, base: &str) -> PathBuf {
        self.episodes_dir().join(format!("{base}.mp3"))
    }

    /// Persisted script path for an output basename.
    #[must_use]
    pub fn script_path(&self, base: &str) -> PathBuf {
        self.scripts_dir().join(format!("{base}.json"))
    }

    /// Per-job log path for an output basename.
    #[must_use]
    pub fn log_path(&self, base: &str) -> PathBuf {
        self.logs_dir().join(format!("{base}.log"))
    }

    /// Scratch directory for a run token (`tempfiles/run-<token>`).
    #[must_use]
    pub fn scratch_dir(&self, run_token: &str) -> PathBuf {
        self.temp_root().join(format!("run-{run_token}"))
    }

    /// Create the full tree and verify the root is writable.
    pub fn ensure(&self) -> Result<(), PathError> {
        for dir in [
            self.root.clone(),
            self.episodes_dir(),
            self.scripts_dir(),
            self.logs_dir(),
            self.temp_root(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|source| PathError::CreateFailed {
                path: dir.clone(),
                source,
            })?;
        }

        // Probe writability with a throwaway file.
        let probe = self.root.join(".write-probe");
        std::fs::write(&probe, b"ok").map_err(|source| PathError::NotWritable {
            path: self.root.clone(),
            source,
        })?;
        let _ = std::fs::remove_file(&probe);

        Ok(())
    }
}

/// Sanitize an arbitrary title into a filesystem-safe output basename.
///
/// Lowercases, maps runs of non-alphanumerics to single hyphens, and trims
/// to at most 48 characters.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
        if slug.len() >= 48 {
            break;
        }
    }
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        "episode".to_string()
    } else {
        slug
    }
}
