//! Fluent API for building test configurations
//!
//! Every path of the built config points into a private temporary directory:
//!
//! ```text
//! <tmp>/cache/    global.cache_dir
//! <tmp>/logs/     global.log_directory
//! <tmp>/remote/   default local upload target
//! ```

use cloud_backup::config::{
    Config, DatabaseConfig, GlobalConfig, ProcessorConfig, UploadConfig,
};
use cloud_backup::databases::Engine;
use cloud_backup::processor::Compression;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder for creating test configurations
pub struct ConfigBuilder {
    temp_dir: TempDir,
    global: GlobalConfig,
    database: DatabaseConfig,
    processor: ProcessorConfig,
    upload: UploadConfig,
}

impl ConfigBuilder {
    /// Create a ConfigBuilder whose dump is a `sh` one-liner and whose upload is a local copy
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let global = GlobalConfig {
            cache_dir: temp_dir.path().join("cache"),
            hostname: Some("test-host".to_string()),
            timeout_seconds: Some(60),
            lock: true,
            log_directory: temp_dir.path().join("logs"),
            log_level: "debug".to_string(),
            log_max_files: 3,
        };

        let database = DatabaseConfig {
            engine: Engine::Mysql,
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "echo 'CREATE TABLE users (id INT);' > {data_path}/all.sql".to_string(),
            ],
            env: HashMap::new(),
        };

        let upload = UploadConfig::Local {
            path: temp_dir.path().join("remote"),
        };

        Self {
            temp_dir,
            global,
            database,
            processor: ProcessorConfig::default(),
            upload,
        }
    }

    /// Set the hostname used in archive names
    pub fn with_hostname(mut self, hostname: &str) -> Self {
        self.global.hostname = Some(hostname.to_string());
        self
    }

    /// Set or clear the per-command timeout
    pub fn with_timeout(mut self, seconds: Option<u64>) -> Self {
        self.global.timeout_seconds = seconds;
        self
    }

    /// Disable the run lock
    pub fn without_lock(mut self) -> Self {
        self.global.lock = false;
        self
    }

    /// Replace the dump command
    pub fn with_database(mut self, engine: Engine, program: &str, args: &[&str]) -> Self {
        self.database.engine = engine;
        self.database.program = program.to_string();
        self.database.args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Add an environment variable for the dump command
    pub fn with_database_env(mut self, key: &str, value: &str) -> Self {
        self.database.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Add a folder copied next to the dump
    pub fn add_folder(mut self, path: &Path) -> Self {
        self.processor.folders.push(path.to_path_buf());
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.processor.compression = compression;
        self
    }

    pub fn with_archive_prefix(mut self, prefix: &str) -> Self {
        self.processor.archive_prefix = prefix.to_string();
        self
    }

    /// Upload by copying into `path`
    pub fn with_local_upload(mut self, path: &Path) -> Self {
        self.upload = UploadConfig::Local {
            path: path.to_path_buf(),
        };
        self
    }

    /// Upload by running `program` with `args`
    pub fn with_command_upload(mut self, program: &str, args: &[&str]) -> Self {
        self.upload = UploadConfig::Command {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            env: HashMap::new(),
        };
        self
    }

    /// Get the temp directory path
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the configured cache directory
    pub fn cache_dir(&self) -> &Path {
        &self.global.cache_dir
    }

    /// Default local upload target
    pub fn remote_dir(&self) -> PathBuf {
        self.temp_dir.path().join("remote")
    }

    fn config(&self) -> Config {
        Config {
            global: self.global.clone(),
            database: self.database.clone(),
            processor: self.processor.clone(),
            upload: self.upload.clone(),
        }
    }

    /// Write the configuration to `<tmp>/config.toml` and return its path
    pub fn write(&self) -> PathBuf {
        let path = self.temp_dir.path().join("config.toml");
        let text = toml::to_string_pretty(&self.config()).expect("Failed to serialize config");
        fs::write(&path, text).expect("Failed to write config");
        path
    }

    /// Build the Config
    pub fn build(self) -> Config {
        self.config()
    }

    /// Keep the temp directory alive alongside the config
    pub fn persist(self) -> (Config, TempDir) {
        let config = self.config();
        (config, self.temp_dir)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
