//! File-based locking to prevent concurrent runs against one cache directory

use fd_lock::RwLock;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of the lock, created directly under the cache directory
pub const LOCK_FILE_NAME: &str = "cloud-backup.lock";

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Another backup run holds the lock {}", path.display())]
    Held { path: PathBuf },

    #[error("Failed to open lock file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Get the lock file path for a cache directory.
/// It sits outside the job directory, which cleanup removes.
pub fn lock_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(LOCK_FILE_NAME)
}

/// Run `f` while holding an exclusive lock on `path`.
/// Fails immediately with [`LockError::Held`] if another holder exists.
pub fn hold<T>(path: &Path, f: impl FnOnce() -> T) -> Result<T, LockError> {
    let io_error = |source| LockError::Io {
        path: path.to_path_buf(),
        source,
    };

    debug!("Attempting to acquire lock: {:?}", path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(io_error)?;

    let mut lock = RwLock::new(file);
    let _guard = match lock.try_write() {
        Ok(guard) => guard,
        Err(e) if e.kind() == ErrorKind::WouldBlock => {
            return Err(LockError::Held {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(io_error(e)),
    };

    info!("Acquired backup lock: {:?}", path);
    let result = f();
    info!("Released backup lock: {:?}", path);

    Ok(result)
}
