//! Upload clients moving the finished archive off the machine

pub mod command;
pub mod local;

pub use command::CommandClient;
pub use local::LocalClient;

use crate::config::UploadConfig;
use crate::utils::CommandExecutor;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Transfers an archive to its remote store
#[cfg_attr(test, mockall::automock)]
pub trait UploadClient: Send + Sync {
    /// Upload the archive at `archive`
    fn upload(&self, archive: &Path) -> Result<()>;

    /// Get client name (for logging)
    fn name(&self) -> &'static str;

    /// Human readable target, e.g. a directory or remote URL
    fn target(&self) -> String;
}

/// Build the client described by the `[upload]` section
pub fn from_config(
    config: &UploadConfig,
    executor: Arc<dyn CommandExecutor>,
    timeout: Option<Duration>,
) -> Box<dyn UploadClient> {
    match config {
        UploadConfig::Local { path } => Box::new(LocalClient::new(crate::config::expand_tilde(path))),
        UploadConfig::Command { program, args, env } => {
            let mut env: Vec<(String, String)> =
                env.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            env.sort();
            Box::new(
                CommandClient::new(program.clone(), args.clone(), executor)
                    .with_env(env)
                    .with_timeout(timeout),
            )
        }
    }
}
