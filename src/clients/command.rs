//! Upload through an external tool such as `rclone`, `aws s3 cp` or `scp`.
//! Arguments may use the placeholders `{archive}` and `{filename}`.

use super::UploadClient;
use crate::utils::{expand_placeholders, CommandExecutor, CommandLine};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct CommandClient {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    executor: Arc<dyn CommandExecutor>,
    timeout: Option<Duration>,
}

impl CommandClient {
    pub fn new(program: String, args: Vec<String>, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            program,
            args,
            env: Vec::new(),
            executor,
            timeout: None,
        }
    }

    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Command uploading `archive`
    pub fn command_for(&self, archive: &Path) -> CommandLine {
        let archive_str = archive.to_string_lossy();
        let filename = archive
            .file_name()
            .map(|f| f.to_string_lossy())
            .unwrap_or_default();
        let values = [("archive", archive_str.as_ref()), ("filename", filename.as_ref())];

        let mut command = CommandLine::new(&self.program)
            .args(self.args.iter().map(|arg| expand_placeholders(arg, &values)));
        for (key, value) in &self.env {
            command = command.env(key, value);
        }
        command
    }
}

impl UploadClient for CommandClient {
    fn upload(&self, archive: &Path) -> Result<()> {
        let command = self.command_for(archive);
        info!("Uploading with: {}", command);

        self.executor
            .run(&command, self.timeout)
            .context(format!("Upload command failed: {}", self.program))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "command"
    }

    fn target(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
