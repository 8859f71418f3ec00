//! Copy configured folders into the job directory so they end up in the archive

use super::job::BackupJob;
use crate::error::BackupError;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Directory below `base_path` receiving the folder copies
pub const FOLDERS_DIR: &str = "folders";

/// Destination of `folder` inside the job directory: `<base>/folders/<folder name>`
pub fn destination_for(job: &BackupJob, folder: &Path) -> Option<PathBuf> {
    folder
        .file_name()
        .map(|name| job.base_path.join(FOLDERS_DIR).join(name))
}

/// Names that more than one folder would be copied to
pub fn duplicate_names(folders: &[PathBuf]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();

    for name in folders.iter().filter_map(|f| f.file_name()) {
        let name = name.to_string_lossy().to_string();
        if !seen.insert(name.clone()) && !duplicates.contains(&name) {
            duplicates.push(name);
        }
    }

    duplicates
}

/// Copy each folder tree into the job directory. Returns the number of files copied.
///
/// Missing folders are skipped with a warning. Symlinks are not followed or copied.
pub fn copy_folders(job: &BackupJob, folders: &[PathBuf]) -> Result<usize, BackupError> {
    if folders.is_empty() {
        return Ok(0);
    }

    info!("Copying {} folders", folders.len());

    let mut copied = 0;

    for folder in folders {
        if !folder.is_dir() {
            warn!("Folder does not exist, skipping: {:?}", folder);
            continue;
        }

        let Some(destination) = destination_for(job, folder) else {
            warn!("Folder has no name, skipping: {:?}", folder);
            continue;
        };

        copied += copy_tree(folder, &destination)?;
    }

    info!("Copied {} files from configured folders", copied);
    Ok(copied)
}

fn copy_tree(source: &Path, destination: &Path) -> Result<usize, BackupError> {
    let mut copied = 0;

    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
            BackupError::filesystem("read", &path, source)
        })?;

        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| BackupError::filesystem("read", entry.path(), std::io::Error::other(e)))?;
        let target = destination.join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| BackupError::filesystem("create directory", &target, e))?;
        } else if file_type.is_file() {
            fs::copy(entry.path(), &target)
                .map_err(|e| BackupError::filesystem("copy", entry.path(), e))?;
            copied += 1;
        } else {
            debug!("Skipping non-regular file {:?}", entry.path());
        }
    }

    Ok(copied)
}
