//! Dumper driven entirely by configuration
//!
//! The program and its arguments come from the config file, so any dump tool
//! (`mysqldump`, `pg_dumpall`, `mongodump`, ...) can be plugged in. Arguments may use
//! the placeholders `{data_path}` and `{base_path}`.

use super::{DatabaseDumper, Engine};
use crate::config::DatabaseConfig;
use crate::processor::BackupJob;
use crate::utils::{expand_placeholders, CommandLine};

#[derive(Debug, Clone)]
pub struct CommandDumper {
    engine: Engine,
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
}

impl CommandDumper {
    pub fn new(engine: Engine, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            engine,
            program: program.into(),
            args,
            env: Vec::new(),
        }
    }

    pub fn from_config(config: &DatabaseConfig) -> Self {
        let mut env: Vec<(String, String)> = config
            .env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        env.sort();

        Self {
            engine: config.engine,
            program: config.program.clone(),
            args: config.args.clone(),
            env,
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

impl DatabaseDumper for CommandDumper {
    fn path_segment(&self) -> &str {
        self.engine.path_segment()
    }

    fn command_for_dump(&self, job: &BackupJob) -> CommandLine {
        let data_path = job.data_path.to_string_lossy();
        let base_path = job.base_path.to_string_lossy();
        let values = [("data_path", data_path.as_ref()), ("base_path", base_path.as_ref())];

        let mut command = CommandLine::new(&self.program)
            .args(self.args.iter().map(|arg| expand_placeholders(arg, &values)));
        for (key, value) in &self.env {
            command = command.env(key, value);
        }
        command
    }
}
