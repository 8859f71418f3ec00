//! Test utilities for cloud-backup
//!
//! This crate provides shared fixtures, a config builder and a log
//! capture layer for testing the cloud-backup pipeline.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{host1_manager, FileDumper, RecordingClient, TarWritingExecutor, TestContext};
//!
//! #[test]
//! fn my_test() {
//!     let ctx = TestContext::new();
//!     let client = RecordingClient::new();
//!     let manager = host1_manager(
//!         ctx.temp_dir(),
//!         Box::new(FileDumper::mysql()),
//!         client.clone(),
//!         TarWritingExecutor::new(),
//!     );
//!     assert!(manager.execute());
//! }
//! ```

pub mod archive;
pub mod config_builder;
pub mod fixtures;
pub mod log_capture;
pub mod test_context;

// Re-export commonly used items
pub use archive::{archive_entries, archive_file};
pub use config_builder::ConfigBuilder;
pub use fixtures::*;
pub use log_capture::{CapturedEvent, LogCapture};
pub use test_context::{ResultAssertions, TestContext};

// Re-export types from the main crate for convenience
pub use cloud_backup::config::{Config, GlobalConfig, ProcessorConfig, UploadConfig};
pub use cloud_backup::error::{BackupError, PipelineError, Stage};
pub use cloud_backup::managers::backup::{BackupManager, FAILURE_MESSAGE};
pub use cloud_backup::processor::{BackupJob, Compression};
pub use cloud_backup::utils::executor::mock::{MockExecutor, MockResponse};
pub use cloud_backup::utils::executor::CommandExecutor;

/// Common test result type
pub type TestResult<T = ()> = anyhow::Result<T>;
