pub mod command;

pub use command::CommandDumper;

use crate::processor::BackupJob;
use crate::utils::{CommandExecutor, CommandLine, ProcessError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Database engine; also names the dump subdirectory of the job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Mysql,
    Postgresql,
    Mongo,
}

impl Engine {
    pub fn path_segment(self) -> &'static str {
        match self {
            Engine::Mysql => "mysql",
            Engine::Postgresql => "postgresql",
            Engine::Mongo => "mongo",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// Trait for database dumpers
pub trait DatabaseDumper: Send + Sync {
    /// Subdirectory of the job receiving the dump files
    fn path_segment(&self) -> &str;

    /// Command producing the dump inside `job.data_path`
    fn command_for_dump(&self, job: &BackupJob) -> CommandLine;

    /// Populate `job.data_path`
    fn dump(
        &self,
        job: &BackupJob,
        executor: &dyn CommandExecutor,
        timeout: Option<Duration>,
    ) -> Result<(), ProcessError> {
        executor.run(&self.command_for_dump(job), timeout).map(|_| ())
    }
}
