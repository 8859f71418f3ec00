//! Working directory layout of a single backup run

use crate::error::BackupError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the job root directory below the cache directory
pub const JOB_DIR: &str = "db";

/// One backup run's working directory.
///
/// ```text
/// base_path     <cache>/db/
/// data_path     <cache>/db/mysql/
/// archive_path  <cache>/db/web01_2024_01_02-03_04_05.tar   (after compression)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupJob {
    pub base_path: PathBuf,
    pub data_path: PathBuf,
    pub archive_path: Option<PathBuf>,
}

impl BackupJob {
    /// Compute the layout for `cache_root` without touching the filesystem
    pub fn layout(cache_root: &Path, engine_segment: &str) -> Self {
        let base_path = cache_root.join(JOB_DIR);
        let data_path = base_path.join(engine_segment);

        Self {
            base_path,
            data_path,
            archive_path: None,
        }
    }

    /// Compute the layout and create the data directory (and its parents).
    /// Safe to call when the directories already exist.
    pub fn prepare(cache_root: &Path, engine_segment: &str) -> Result<Self, BackupError> {
        let job = Self::layout(cache_root, engine_segment);

        warn_about_leftovers(&job);

        fs::create_dir_all(&job.data_path)
            .map_err(|e| BackupError::filesystem("create directory", &job.data_path, e))?;

        debug!("Prepared working directory {:?}", job.data_path);
        Ok(job)
    }

    /// Path of the archive; fails until the job has been compressed
    pub fn archive(&self) -> Result<&Path, BackupError> {
        self.archive_path.as_deref().ok_or_else(|| {
            BackupError::filesystem(
                "locate archive in",
                &self.base_path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "job has not been compressed"),
            )
        })
    }

    /// Remove the whole job directory, archive included
    pub fn clean_up(&self) -> Result<(), BackupError> {
        match fs::remove_dir_all(&self.base_path) {
            Ok(()) => {
                info!("Removed working directory {:?}", self.base_path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackupError::filesystem("remove", &self.base_path, e)),
        }
    }
}

// Files left by an earlier failed run end up in the next archive.
fn warn_about_leftovers(job: &BackupJob) {
    let Ok(entries) = fs::read_dir(&job.base_path) else {
        return;
    };

    let leftovers: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path() != job.data_path)
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();

    if !leftovers.is_empty() {
        warn!(
            "Working directory {:?} still holds files from a previous run: {}",
            job.base_path,
            leftovers.join(", ")
        );
    }
}
