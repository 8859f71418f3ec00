use crate::databases::Engine;
use crate::processor::Compression;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub global: GlobalConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
    pub upload: UploadConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Working directory root; the job lives in `<cache_dir>/db/`
    pub cache_dir: PathBuf,

    /// Hostname used in archive names (defaults to the system hostname)
    #[serde(default)]
    pub hostname: Option<String>,

    /// Per-command timeout; commands wait indefinitely when unset.
    /// On unix a timed out command is killed together with everything it spawned.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Refuse to start while another run uses the same cache directory
    #[serde(default = "default_lock")]
    pub lock: bool,

    /// Logging configuration
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_max_files")]
    pub log_max_files: u32,
}

/// Dump command for the database
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub engine: Engine,

    /// Dump program, looked up on PATH
    pub program: String,

    /// Arguments; `{data_path}` and `{base_path}` are substituted
    #[serde(default)]
    pub args: Vec<String>,

    /// Extra environment, typically credentials
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// Archive settings and extra folders to include
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProcessorConfig {
    #[serde(default)]
    pub compression: Compression,

    /// Prepended to the archive file name
    #[serde(default)]
    pub archive_prefix: String,

    /// Folders copied next to the dump before compression
    #[serde(default)]
    pub folders: Vec<PathBuf>,
}

/// Upload target
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UploadConfig {
    /// Copy into a local or mounted directory
    Local { path: PathBuf },

    /// Run an external program; `{archive}` and `{filename}` are substituted
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        env: HashMap<String, String>,
    },
}

// Default value functions

fn default_lock() -> bool { true }
fn default_log_directory() -> PathBuf { PathBuf::from("~/logs") }
fn default_log_level() -> String { "info".to_string() }
fn default_log_max_files() -> u32 { 10 }
