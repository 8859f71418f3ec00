//! Error types shared by the backup pipeline

use crate::utils::locker::LockError;
use crate::utils::ProcessError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Failure of a single pipeline step
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("Failed to {action} {}: {source}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Upload via '{client}' failed: {source:#}")]
    Upload {
        client: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Lock(#[from] LockError),
}

impl BackupError {
    pub fn filesystem(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        BackupError::Filesystem {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Pipeline stage, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Lock,
    Dump,
    CopyFolders,
    Compress,
    Upload,
    Cleanup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Lock => "lock",
            Stage::Dump => "dump",
            Stage::CopyFolders => "copy folders",
            Stage::Compress => "compress",
            Stage::Upload => "upload",
            Stage::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

/// A pipeline run that stopped at `stage`
#[derive(Debug, thiserror::Error)]
#[error("Backup failed during {stage}: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: BackupError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: impl Into<BackupError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}
