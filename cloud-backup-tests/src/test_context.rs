//! Per-test scratch directory with helpers for building backup inputs
//!
//! The directory and everything under it is removed when the context drops.

use crate::config_builder::ConfigBuilder;
use cloud_backup::config::Config;
use cloud_backup::processor::job::JOB_DIR;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestContext {
    temp_dir: TempDir,
    config: Option<Config>,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
            config: None,
        }
    }

    /// Context owning the directory and config of a [`ConfigBuilder`]
    pub fn from_builder(builder: ConfigBuilder) -> Self {
        let (config, temp_dir) = builder.persist();
        Self {
            temp_dir,
            config: Some(config),
        }
    }

    /// Context with the default [`ConfigBuilder`] configuration
    pub fn with_config() -> Self {
        Self::from_builder(ConfigBuilder::new())
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    /// Configured cache directory, `<tmp>/cache` without a config.
    /// Not created; the pipeline creates it on demand.
    pub fn cache_dir(&self) -> PathBuf {
        match self.config {
            Some(ref config) => config.global.cache_dir.clone(),
            None => self.temp_dir.path().join("cache"),
        }
    }

    /// Job directory a run works in, `<cache>/db`
    pub fn job_dir(&self) -> PathBuf {
        self.cache_dir().join(JOB_DIR)
    }

    pub fn create_subdir(&self, name: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::create_dir_all(&path).expect("Failed to create subdirectory");
        path
    }

    /// Write `content` to `name`, creating parent directories
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Folder `name` holding `files` given as (relative path, content)
    pub fn create_folder(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let folder = self.create_subdir(name);
        for (file, content) in files {
            self.create_file(&format!("{}/{}", name, file), content);
        }
        folder
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Assertions on `Result` that print the other side on failure
pub trait ResultAssertions<T> {
    fn assert_ok(self) -> T;

    /// The `Debug` form of the error must contain `needle`
    fn assert_err_contains(self, needle: &str);
}

impl<T: Debug, E: Debug> ResultAssertions<T> for Result<T, E> {
    fn assert_ok(self) -> T {
        match self {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    }

    fn assert_err_contains(self, needle: &str) {
        match self {
            Ok(value) => panic!("Expected Err containing '{}', got Ok: {:?}", needle, value),
            Err(e) => {
                let message = format!("{:?}", e);
                assert!(message.contains(needle), "Error '{}' does not contain '{}'", message, needle);
            }
        }
    }
}
