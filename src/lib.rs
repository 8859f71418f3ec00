//! Cloud Backup Library
//!
//! Dumps a database into a local working directory, archives it together with
//! optional folders, uploads the archive and removes the local copy.

pub mod clients;
pub mod config;
pub mod databases;
pub mod error;
pub mod managers;
pub mod processor;
pub mod utils;

// Re-export commonly used types
pub use config::{load_config, Config};
pub use error::{BackupError, PipelineError, Stage};
pub use managers::backup::{BackupManager, BackupPlan, BackupReport};
pub use managers::logging::{init_console_logging, init_logging, LogGuard, LoggingConfig};
