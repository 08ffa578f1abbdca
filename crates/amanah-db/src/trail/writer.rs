//! JSONL trail writer.
//!
//! Appends `JobTrailRecord`s to per-job `{trail_dir}/{job}.jsonl` files.
//! Uses `serde_jsonlines::append_json_lines` for atomic per-line appends.

use std::path::{Path, PathBuf};

use amanah_core::trail::JobTrailRecord;

use crate::error::DatabaseError;

/// Appends job trail records to per-job JSONL files.
pub struct TrailWriter {
    trail_dir: PathBuf,
    enabled: bool,
}

impl TrailWriter {
    /// Create a new `TrailWriter` pointing at the given directory.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created.
    pub fn new(trail_dir: PathBuf) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(&trail_dir).map_err(|e| DatabaseError::Other(e.into()))?;
        Ok(Self {
            trail_dir,
            enabled: true,
        })
    }

    /// Create a disabled writer (for testing or when no trail is configured).
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            trail_dir: PathBuf::new(),
            enabled: false,
        }
    }

    /// Whether trail writing is currently enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append a record to the job's JSONL file.
    ///
    /// File path: `{trail_dir}/{record.job}.jsonl`
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the file write fails.
    pub fn append(&self, record: &JobTrailRecord) -> Result<(), DatabaseError> {
        if !self.enabled {
            return Ok(());
        }

        serde_jsonlines::append_json_lines(self.path_for(&record.job), [record])
            .map_err(|e| DatabaseError::Other(e.into()))?;
        Ok(())
    }

    /// File a job's records are appended to.
    #[must_use]
    pub fn path_for(&self, job: &str) -> PathBuf {
        self.trail_dir.join(format!("{job}.jsonl"))
    }

    /// The directory where trail files are stored.
    #[must_use]
    pub fn trail_dir(&self) -> &Path {
        &self.trail_dir
    }
}
