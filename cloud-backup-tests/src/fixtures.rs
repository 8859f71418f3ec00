//! Test fixtures: dumpers, upload clients and executors with predictable behaviour

use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveDateTime};
use cloud_backup::clients::UploadClient;
use cloud_backup::databases::DatabaseDumper;
use cloud_backup::managers::backup::BackupManager;
use cloud_backup::processor::{BackupJob, FixedClock, StaticHost};
use cloud_backup::utils::executor::mock::MockExecutor;
use cloud_backup::utils::{CommandExecutor, CommandLine, ProcessError};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Arc;
use std::time::Duration;

/// 2024-01-02 03:04:05, the instant every fixture manager runs at
pub fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_opt(3, 4, 5))
        .expect("valid date")
}

/// Archive name produced by [`host1_manager`]
pub const HOST1_ARCHIVE: &str = "host1_2024_01_02-03_04_05.tar";

/// Manager running as `host1` at [`fixed_time`]
pub fn host1_manager(
    cache_dir: &Path,
    dumper: Box<dyn DatabaseDumper>,
    client: RecordingClient,
    executor: impl CommandExecutor + 'static,
) -> BackupManager {
    BackupManager::new(cache_dir, dumper, Box::new(client))
        .with_executor(Arc::new(executor))
        .with_clock(Arc::new(FixedClock(fixed_time())))
        .with_host(Arc::new(StaticHost("host1".to_string())))
}

/// Dumper that writes fixed files into the data directory instead of running a program
#[derive(Debug, Clone)]
pub struct FileDumper {
    segment: String,
    files: Vec<(String, String)>,
}

impl FileDumper {
    pub fn new(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            files: Vec::new(),
        }
    }

    /// A `mysql` dumper producing `all.sql`
    pub fn mysql() -> Self {
        Self::new("mysql").with_file("all.sql", "CREATE TABLE users (id INT);\n")
    }

    pub fn with_file(mut self, name: &str, content: &str) -> Self {
        self.files.push((name.to_string(), content.to_string()));
        self
    }
}

impl DatabaseDumper for FileDumper {
    fn path_segment(&self) -> &str {
        &self.segment
    }

    fn command_for_dump(&self, job: &BackupJob) -> CommandLine {
        CommandLine::new("fixture-dump").arg(job.data_path.to_string_lossy())
    }

    fn dump(
        &self,
        job: &BackupJob,
        _executor: &dyn CommandExecutor,
        _timeout: Option<Duration>,
    ) -> Result<(), ProcessError> {
        for (name, content) in &self.files {
            fs::write(job.data_path.join(name), content).map_err(|source| ProcessError::Spawn {
                program: "fixture-dump".to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Dumper whose dump always fails like a crashed dump program
#[derive(Debug, Clone)]
pub struct FailingDumper {
    stderr: String,
}

impl FailingDumper {
    pub fn new(stderr: &str) -> Self {
        Self {
            stderr: stderr.to_string(),
        }
    }
}

impl DatabaseDumper for FailingDumper {
    fn path_segment(&self) -> &str {
        "mysql"
    }

    fn command_for_dump(&self, _job: &BackupJob) -> CommandLine {
        CommandLine::new("mysqldump").arg("--all-databases")
    }

    fn dump(
        &self,
        _job: &BackupJob,
        _executor: &dyn CommandExecutor,
        _timeout: Option<Duration>,
    ) -> Result<(), ProcessError> {
        Err(ProcessError::Failed {
            program: "mysqldump".to_string(),
            code: Some(2),
            stderr: self.stderr.clone(),
        })
    }
}

/// One call to [`RecordingClient::upload`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    pub path: PathBuf,
    /// Whether the archive existed when the upload ran
    pub existed: bool,
}

/// Upload client recording every upload; clones share the record
#[derive(Debug, Clone, Default)]
pub struct RecordingClient {
    uploads: Arc<Mutex<Vec<RecordedUpload>>>,
    failure: Option<String>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client whose uploads fail with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            uploads: Arc::default(),
            failure: Some(message.to_string()),
        }
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().len()
    }
}

impl UploadClient for RecordingClient {
    fn upload(&self, archive: &Path) -> Result<()> {
        self.uploads.lock().push(RecordedUpload {
            path: archive.to_path_buf(),
            existed: archive.is_file(),
        });

        if let Some(ref message) = self.failure {
            bail!("{}", message);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }

    fn target(&self) -> String {
        "memory".to_string()
    }
}

/// Executor that records calls like [`MockExecutor`] and, for a successful
/// `tar` call, writes a placeholder file at the archive path
#[derive(Clone, Default)]
pub struct TarWritingExecutor {
    inner: MockExecutor,
}

impl TarWritingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mock(inner: MockExecutor) -> Self {
        Self { inner }
    }

    pub fn mock(&self) -> &MockExecutor {
        &self.inner
    }
}

impl CommandExecutor for TarWritingExecutor {
    fn run(&self, command: &CommandLine, timeout: Option<Duration>) -> Result<Output, ProcessError> {
        let output = self.inner.run(command, timeout)?;

        if command.program == "tar" {
            if let Some(archive) = archive_argument(command) {
                fs::write(archive, b"placeholder archive").map_err(|source| {
                    ProcessError::Spawn {
                        program: command.program.clone(),
                        source,
                    }
                })?;
            }
        }

        Ok(output)
    }
}

// The archive path follows the create flag (-czf, -cjf or -cf)
fn archive_argument(command: &CommandLine) -> Option<&str> {
    command
        .args
        .iter()
        .position(|arg| arg.starts_with("-c") && arg.ends_with('f'))
        .and_then(|index| command.args.get(index + 1))
        .map(String::as_str)
}
