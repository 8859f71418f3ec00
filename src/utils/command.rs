//! Utilities for running commands with proper error handling and timeouts

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use tracing::{debug, warn};

/// Error raised when an external command cannot be run or exits non-zero
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed with exit code {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
}

impl ProcessError {
    /// Captured standard error, if the process got far enough to produce any
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ProcessError::Failed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

/// A fully structured process invocation (program plus argv, never a shell string)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub working_dir: Option<PathBuf>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.working_dir = Some(dir.to_path_buf());
        self
    }
}

// Env values are left out on purpose, they usually carry credentials.
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Replace `{name}` placeholders in a configured argument
pub fn expand_placeholders(arg: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(arg.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{}}}", name), value)
    })
}

/// Run a command with optional timeout
pub fn run_command(command: &CommandLine, timeout: Option<Duration>) -> Result<Output, ProcessError> {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args);
    cmd.envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    if let Some(dir) = &command.working_dir {
        cmd.current_dir(dir);
    }

    debug!("Running command: {}", command);

    let output = match timeout {
        Some(timeout_duration) => output_with_timeout(cmd, &command.program, timeout_duration)?,
        None => cmd.output().map_err(|source| ProcessError::Spawn {
            program: command.program.clone(),
            source,
        })?,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!("Command failed: {}", command);
        warn!("Stderr: {}", stderr);
        return Err(ProcessError::Failed {
            program: command.program.clone(),
            code: output.status.code(),
            stderr,
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.is_empty() {
        debug!("Command output: {}", stdout);
    }

    Ok(output)
}

/// Wait for the child on a private runtime so the caller can stay synchronous.
///
/// On unix the child leads its own process group and the whole group is killed
/// when the timeout elapses, so `sh -c` wrappers do not leave workers behind.
fn output_with_timeout(mut cmd: Command, program: &str, timeout: Duration) -> Result<Output, ProcessError> {
    let spawn_error = |source| ProcessError::Spawn {
        program: program.to_string(),
        source,
    };

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(spawn_error)?;

    runtime.block_on(async {
        let mut cmd = tokio::process::Command::from(cmd);
        cmd.kill_on_drop(true);

        let child = cmd.spawn().map_err(spawn_error)?;
        let pid = child.id();

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(output) => output.map_err(spawn_error),
            Err(_) => {
                if let Some(pid) = pid {
                    kill_process_group(pid);
                }
                Err(ProcessError::TimedOut {
                    program: program.to_string(),
                    timeout,
                })
            }
        }
    })
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // SAFETY: kill(2) takes no pointers; a negative pid addresses the group.
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } != 0 {
        debug!("Process group {} already gone: {}", pgid, std::io::Error::last_os_error());
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}
