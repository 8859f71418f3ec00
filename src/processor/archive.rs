//! Archive naming and tar compression of the job directory

use super::job::BackupJob;
use crate::error::BackupError;
use crate::utils::{CommandExecutor, CommandLine};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Timestamp layout used in archive names, e.g. `2013_01_12-01_36_33`
pub const TIMESTAMP_FORMAT: &str = "%Y_%m_%d-%H_%M_%S";

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Source of the machine name written into archive names
pub trait HostIdentity: Send + Sync {
    fn hostname(&self) -> String;
}

/// Hostname reported by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostIdentity for SystemHost {
    fn hostname(&self) -> String {
        gethostname::gethostname().to_string_lossy().to_string()
    }
}

/// Hostname taken from configuration
#[derive(Debug, Clone)]
pub struct StaticHost(pub String);

impl HostIdentity for StaticHost {
    fn hostname(&self) -> String {
        self.0.clone()
    }
}

/// Compression applied by tar. The archive keeps the `.tar` extension in every mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Gzip,
    Bzip2,
    None,
}

impl Compression {
    /// tar create flags for this mode
    fn tar_flags(self) -> &'static str {
        match self {
            Compression::Gzip => "-czf",
            Compression::Bzip2 => "-cjf",
            Compression::None => "-cf",
        }
    }
}

/// Name of one archive: `<prefix><hostname>_<YYYY_MM_DD-HH_MM_SS>.tar`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDescriptor {
    pub hostname: String,
    pub timestamp: NaiveDateTime,
    pub filename: String,
}

impl ArchiveDescriptor {
    pub fn new(prefix: &str, hostname: &str, timestamp: NaiveDateTime) -> Self {
        let hostname = sanitize_hostname(hostname);
        let filename = format!(
            "{}{}_{}.tar",
            prefix,
            hostname,
            timestamp.format(TIMESTAMP_FORMAT)
        );

        Self {
            hostname,
            timestamp,
            filename,
        }
    }
}

/// Replace anything that is not safe inside a single file name component
fn sanitize_hostname(hostname: &str) -> String {
    let cleaned: String = hostname
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "localhost".to_string()
    } else {
        cleaned
    }
}

/// What to archive and what to leave out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
    /// Directory whose contents are archived (entries are relative to it)
    pub source_dir: PathBuf,
    /// Output file
    pub archive_path: PathBuf,
    /// Names excluded from the archive
    pub exclude: Vec<String>,
    pub compression: Compression,
}

impl ArchiveRequest {
    /// Archive `source_dir` into `source_dir/filename`, excluding the archive itself
    pub fn self_excluding(source_dir: &Path, filename: &str, compression: Compression) -> Self {
        Self {
            source_dir: source_dir.to_path_buf(),
            archive_path: source_dir.join(filename),
            exclude: vec![filename.to_string()],
            compression,
        }
    }

    /// `tar --no-wildcards --exclude=<name>... -czf <archive> -C <source> .`
    ///
    /// Excluded names match literally; a `[` or `*` in a name is not a pattern.
    pub fn to_command(&self) -> CommandLine {
        CommandLine::new("tar")
            .arg("--no-wildcards")
            .args(self.exclude.iter().map(|name| format!("--exclude={}", name)))
            .arg(self.compression.tar_flags())
            .arg(self.archive_path.to_string_lossy())
            .arg("-C")
            .arg(self.source_dir.to_string_lossy())
            .arg(".")
    }
}

/// Archives a job directory into a timestamped tar file inside that same directory
pub struct Compressor {
    executor: Arc<dyn CommandExecutor>,
    clock: Arc<dyn Clock>,
    host: Arc<dyn HostIdentity>,
    compression: Compression,
    prefix: String,
    timeout: Option<Duration>,
}

impl Compressor {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        clock: Arc<dyn Clock>,
        host: Arc<dyn HostIdentity>,
    ) -> Self {
        Self {
            executor,
            clock,
            host,
            compression: Compression::default(),
            prefix: String::new(),
            timeout: None,
        }
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Name the archive after the current host and time
    pub fn describe(&self) -> ArchiveDescriptor {
        ArchiveDescriptor::new(&self.prefix, &self.host.hostname(), self.clock.now())
    }

    /// Archive request for a job, using a freshly computed name
    pub fn request_for(&self, job: &BackupJob) -> (ArchiveDescriptor, ArchiveRequest) {
        let descriptor = self.describe();
        let request =
            ArchiveRequest::self_excluding(&job.base_path, &descriptor.filename, self.compression);
        (descriptor, request)
    }

    /// Archive `job.base_path` and return the job with `archive_path` set
    pub fn compress(&self, mut job: BackupJob) -> Result<BackupJob, BackupError> {
        let (descriptor, request) = self.request_for(&job);

        info!("Compressing {:?} into {}", job.base_path, descriptor.filename);

        self.executor.run(&request.to_command(), self.timeout)?;

        job.archive_path = Some(request.archive_path);
        Ok(job)
    }
}
