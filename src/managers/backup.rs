//! Backup manager - orchestrates backup execution
//!
//! A run goes through a fixed sequence of stages:
//! lock -> dump -> copy folders -> compress -> upload -> cleanup.
//! The first failing stage stops the run. Nothing is rolled back, so when the
//! upload fails the archive stays in the cache directory.

use crate::clients::{self, UploadClient};
use crate::config::{expand_tilde, Config};
use crate::databases::{CommandDumper, DatabaseDumper};
use crate::error::{BackupError, PipelineError, Stage};
use crate::processor::{
    copy_folders, ArchiveRequest, BackupJob, Clock, Compression, Compressor, HostIdentity,
    StaticHost, SystemClock, SystemHost,
};
use crate::utils::locker;
use crate::utils::{CommandExecutor, CommandLine, RealExecutor};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Message logged when a run fails
pub const FAILURE_MESSAGE: &str = "Error while the backup manager was running.";

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct BackupReport {
    pub filename: String,
    pub archive_path: PathBuf,
    pub archive_size: u64,
    pub client: String,
    pub target: String,
    pub elapsed_seconds: f64,
}

/// What a run would do, computed without side effects
#[derive(Debug, Clone)]
pub struct BackupPlan {
    pub job: BackupJob,
    pub dump: CommandLine,
    pub folders: Vec<PathBuf>,
    pub archive: ArchiveRequest,
    pub client: &'static str,
    pub target: String,
}

pub struct BackupManager {
    cache_dir: PathBuf,
    database: Box<dyn DatabaseDumper>,
    client: Box<dyn UploadClient>,
    executor: Arc<dyn CommandExecutor>,
    clock: Arc<dyn Clock>,
    host: Arc<dyn HostIdentity>,
    folders: Vec<PathBuf>,
    compression: Compression,
    archive_prefix: String,
    timeout: Option<Duration>,
    lock: bool,
}

impl BackupManager {
    /// Create new backup manager with system clock, hostname and real processes
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        database: Box<dyn DatabaseDumper>,
        client: Box<dyn UploadClient>,
    ) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            database,
            client,
            executor: Arc::new(RealExecutor::new()),
            clock: Arc::new(SystemClock),
            host: Arc::new(SystemHost),
            folders: Vec::new(),
            compression: Compression::default(),
            archive_prefix: String::new(),
            timeout: None,
            lock: true,
        }
    }

    /// Create backup manager from a loaded configuration
    pub fn from_config(config: &Config) -> Self {
        let executor: Arc<dyn CommandExecutor> = Arc::new(RealExecutor::new());
        let timeout = config.global.timeout();

        let database = Box::new(CommandDumper::from_config(&config.database));
        let client = clients::from_config(&config.upload, executor.clone(), timeout);

        let mut manager = Self::new(config.global.cache_dir(), database, client)
            .with_executor(executor)
            .with_folders(config.processor.folders.iter().map(|f| expand_tilde(f)).collect())
            .with_compression(config.processor.compression)
            .with_archive_prefix(config.processor.archive_prefix.clone())
            .with_timeout(timeout)
            .with_lock(config.global.lock);

        if let Some(ref hostname) = config.global.hostname {
            manager = manager.with_host(Arc::new(StaticHost(hostname.clone())));
        }

        manager
    }

    pub fn with_executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_host(mut self, host: Arc<dyn HostIdentity>) -> Self {
        self.host = host;
        self
    }

    pub fn with_folders(mut self, folders: Vec<PathBuf>) -> Self {
        self.folders = folders;
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_archive_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.archive_prefix = prefix.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }

    fn compressor(&self) -> Compressor {
        Compressor::new(self.executor.clone(), self.clock.clone(), self.host.clone())
            .with_compression(self.compression)
            .with_prefix(self.archive_prefix.clone())
            .with_timeout(self.timeout)
    }

    /// Describe the run without touching the filesystem or running anything
    pub fn plan(&self) -> BackupPlan {
        let job = BackupJob::layout(&self.cache_dir, self.database.path_segment());
        let dump = self.database.command_for_dump(&job);
        let (_, archive) = self.compressor().request_for(&job);

        BackupPlan {
            job,
            dump,
            folders: self.folders.clone(),
            archive,
            client: self.client.name(),
            target: self.client.target(),
        }
    }

    /// Run the backup, returning a report or the stage that failed
    pub fn run(&self) -> Result<BackupReport, PipelineError> {
        if !self.lock {
            return self.run_stages();
        }

        let lock_path = locker::lock_path(&self.cache_dir);
        locker::hold(&lock_path, || self.run_stages())
            .map_err(|e| PipelineError::new(Stage::Lock, e))?
    }

    /// Run the backup and log any failure. Returns true on success.
    pub fn execute(&self) -> bool {
        match self.run() {
            Ok(_) => true,
            Err(e) => {
                log_failure(&e);
                false
            }
        }
    }

    fn run_stages(&self) -> Result<BackupReport, PipelineError> {
        let start_time = Instant::now();

        info!(
            "Starting {} backup in {:?}",
            self.database.path_segment(),
            self.cache_dir
        );

        // Dump
        let job = BackupJob::prepare(&self.cache_dir, self.database.path_segment())
            .map_err(|e| PipelineError::new(Stage::Dump, e))?;
        debug!("Dump command: {}", self.database.command_for_dump(&job));
        self.database
            .dump(&job, self.executor.as_ref(), self.timeout)
            .map_err(|e| PipelineError::new(Stage::Dump, e))?;
        info!("Database dump written to {:?}", job.data_path);

        // Backup folders if specified
        copy_folders(&job, &self.folders).map_err(|e| PipelineError::new(Stage::CopyFolders, e))?;

        // Compress everything
        let job = self
            .compressor()
            .compress(job)
            .map_err(|e| PipelineError::new(Stage::Compress, e))?;
        let archive = job
            .archive()
            .map_err(|e| PipelineError::new(Stage::Compress, e))?
            .to_path_buf();
        let archive_size = match fs::metadata(&archive) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                warn!("Failed to read archive size of {:?}: {}", archive, e);
                0
            }
        };
        info!("Archive ready: {:?} ({} bytes)", archive, archive_size);

        // Transfer
        info!(
            "Uploading with '{}' client to {}",
            self.client.name(),
            self.client.target()
        );
        self.client.upload(&archive).map_err(|source| {
            PipelineError::new(
                Stage::Upload,
                BackupError::Upload {
                    client: self.client.name().to_string(),
                    source,
                },
            )
        })?;

        job.clean_up()
            .map_err(|e| PipelineError::new(Stage::Cleanup, e))?;

        let elapsed = start_time.elapsed();
        info!("Backup completed in {:.2}s", elapsed.as_secs_f64());

        Ok(BackupReport {
            filename: archive
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_default(),
            archive_path: archive,
            archive_size,
            client: self.client.name().to_string(),
            target: self.client.target(),
            elapsed_seconds: elapsed.as_secs_f64(),
        })
    }
}

/// Emit the single critical-severity event for a failed run
pub fn log_failure(error: &PipelineError) {
    error!(
        severity = "critical",
        stage = %error.stage,
        "{}\n{}",
        FAILURE_MESSAGE,
        error
    );
}
