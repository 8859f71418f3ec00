//! Configuration module for cloud-backup
//!
//! This module handles loading and validating configuration from TOML files.
//!
//! ## Example Usage
//!
//! ```no_run
//! use cloud_backup::config;
//!
//! let config = config::load_config("/etc/cloud-backup/config.toml")?;
//! println!("Dumping {} into {:?}", config.database.engine, config.global.cache_dir);
//! # Ok::<(), config::ConfigError>(())
//! ```

mod loader;
mod types;

pub use loader::{load_config, parse_config, validate_config, ConfigError, Result};
pub use types::*;

use std::path::{Path, PathBuf};
use std::time::Duration;

impl GlobalConfig {
    /// Per-command timeout, if configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Cache directory with `~` expanded
    pub fn cache_dir(&self) -> PathBuf {
        expand_tilde(&self.cache_dir)
    }
}

/// Expand tilde (~) in path
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
