use super::UploadClient;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Copies the archive into a directory, e.g. a mounted network share
#[derive(Debug, Clone)]
pub struct LocalClient {
    directory: PathBuf,
}

impl LocalClient {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl UploadClient for LocalClient {
    fn upload(&self, archive: &Path) -> Result<()> {
        let filename = archive
            .file_name()
            .context(format!("Archive path has no file name: {:?}", archive))?;

        fs::create_dir_all(&self.directory)
            .context(format!("Failed to create directory: {:?}", self.directory))?;

        let destination = self.directory.join(filename);
        let bytes = fs::copy(archive, &destination)
            .context(format!("Failed to copy {:?} to {:?}", archive, destination))?;

        info!("Copied {} bytes to {:?}", bytes, destination);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "local"
    }

    fn target(&self) -> String {
        self.directory.display().to_string()
    }
}
