//! The seam between the pipeline and the processes it starts.
//!
//! Dump, tar and command uploads all go through a [`CommandExecutor`], so tests can
//! script their outcomes with [`mock::MockExecutor`] instead of installing the tools.

use super::command::{CommandLine, ProcessError};
use std::process::Output;
use std::time::Duration;

pub trait CommandExecutor: Send + Sync {
    /// Run to completion; non-zero exit and timeouts are errors
    fn run(&self, command: &CommandLine, timeout: Option<Duration>) -> Result<Output, ProcessError>;
}

/// Starts real processes through [`run_command`](super::command::run_command)
#[derive(Debug, Clone, Copy, Default)]
pub struct RealExecutor;

impl RealExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for RealExecutor {
    fn run(&self, command: &CommandLine, timeout: Option<Duration>) -> Result<Output, ProcessError> {
        super::command::run_command(command, timeout)
    }
}

/// Scripted executor for tests, shared with the external test crate.
/// Clones share the recorded calls and the scripted responses.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::process::ExitStatus;
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

    /// One recorded invocation
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct CommandCall {
        pub program: String,
        pub args: Vec<String>,
        pub env: Vec<(String, String)>,
        pub working_dir: Option<PathBuf>,
        pub timeout: Option<Duration>,
    }

    /// What a scripted program does
    #[derive(Clone, Debug)]
    pub enum MockResponse {
        Success { stdout: String, stderr: String },
        Failure { stderr: String, exit_code: i32 },
        Timeout,
    }

    impl Default for MockResponse {
        fn default() -> Self {
            MockResponse::Success {
                stdout: String::new(),
                stderr: String::new(),
            }
        }
    }

    impl MockResponse {
        fn into_result(self, program: &str, timeout: Option<Duration>) -> Result<Output, ProcessError> {
            match self {
                MockResponse::Success { stdout, stderr } => Ok(Output {
                    status: ExitStatus::default(),
                    stdout: stdout.into_bytes(),
                    stderr: stderr.into_bytes(),
                }),
                MockResponse::Failure { stderr, exit_code } => Err(ProcessError::Failed {
                    program: program.to_string(),
                    code: Some(exit_code),
                    stderr,
                }),
                MockResponse::Timeout => Err(ProcessError::TimedOut {
                    program: program.to_string(),
                    timeout: timeout.unwrap_or_default(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct State {
        calls: Vec<CommandCall>,
        responses: HashMap<String, MockResponse>,
        fallback: MockResponse,
    }

    #[derive(Clone, Default)]
    pub struct MockExecutor {
        state: Arc<Mutex<State>>,
    }

    impl MockExecutor {
        /// Every program succeeds with empty output until scripted otherwise
        pub fn new() -> Self {
            Self::default()
        }

        // A test that panicked mid-call must not hide the calls from later assertions.
        fn state(&self) -> MutexGuard<'_, State> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        pub fn expect(self, program: &str, response: MockResponse) -> Self {
            self.state().responses.insert(program.to_string(), response);
            self
        }

        /// Make `program` exit with status 1 and `stderr`
        pub fn fail(self, program: &str, stderr: &str) -> Self {
            self.expect(
                program,
                MockResponse::Failure {
                    stderr: stderr.to_string(),
                    exit_code: 1,
                },
            )
        }

        /// Response for programs without a scripted one
        pub fn with_default_response(self, response: MockResponse) -> Self {
            self.state().fallback = response;
            self
        }

        pub fn get_calls(&self) -> Vec<CommandCall> {
            self.state().calls.clone()
        }

        pub fn calls_to(&self, program: &str) -> Vec<CommandCall> {
            self.state()
                .calls
                .iter()
                .filter(|call| call.program == program)
                .cloned()
                .collect()
        }

        pub fn was_called(&self, program: &str) -> bool {
            self.call_count(program) > 0
        }

        pub fn call_count(&self, program: &str) -> usize {
            self.calls_to(program).len()
        }
    }

    impl CommandExecutor for MockExecutor {
        fn run(&self, command: &CommandLine, timeout: Option<Duration>) -> Result<Output, ProcessError> {
            let response = {
                let mut state = self.state();
                state.calls.push(CommandCall {
                    program: command.program.clone(),
                    args: command.args.clone(),
                    env: command.env.clone(),
                    working_dir: command.working_dir.clone(),
                    timeout,
                });
                state
                    .responses
                    .get(&command.program)
                    .cloned()
                    .unwrap_or_else(|| state.fallback.clone())
            };

            response.into_result(&command.program, timeout)
        }
    }
}
