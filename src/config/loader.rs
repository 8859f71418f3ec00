use super::types::*;
use crate::processor::folders::duplicate_names;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate the configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_global(&config.global)?;

    if config.database.program.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "database.program must not be empty".to_string(),
        ));
    }

    validate_processor(&config.processor)?;
    validate_upload(&config.upload)?;

    Ok(())
}

fn validate_global(global: &GlobalConfig) -> Result<()> {
    if global.cache_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "global.cache_dir must not be empty".to_string(),
        ));
    }

    if let Some(ref hostname) = global.hostname {
        if hostname.trim().is_empty() || has_path_separator(hostname) {
            return Err(ConfigError::ValidationError(format!(
                "global.hostname is not usable in a file name: {:?}",
                hostname
            )));
        }
    }

    if global.timeout_seconds == Some(0) {
        return Err(ConfigError::ValidationError(
            "global.timeout_seconds must be greater than 0 (omit it to disable timeouts)".to_string(),
        ));
    }

    if global.log_max_files == 0 {
        return Err(ConfigError::ValidationError(
            "global.log_max_files must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_processor(processor: &ProcessorConfig) -> Result<()> {
    if has_path_separator(&processor.archive_prefix) {
        return Err(ConfigError::ValidationError(format!(
            "processor.archive_prefix must not contain path separators: {:?}",
            processor.archive_prefix
        )));
    }

    if processor.archive_prefix.contains(GLOB_CHARS) {
        return Err(ConfigError::ValidationError(format!(
            "processor.archive_prefix must not contain wildcard characters: {:?}",
            processor.archive_prefix
        )));
    }

    if let Some(folder) = processor.folders.iter().find(|f| f.file_name().is_none()) {
        return Err(ConfigError::ValidationError(format!(
            "processor.folders entry has no folder name: {:?}",
            folder
        )));
    }

    let duplicates = duplicate_names(&processor.folders);
    if !duplicates.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "processor.folders contains several folders named: {}",
            duplicates.join(", ")
        )));
    }

    Ok(())
}

fn validate_upload(upload: &UploadConfig) -> Result<()> {
    match upload {
        UploadConfig::Local { path } if path.as_os_str().is_empty() => Err(
            ConfigError::ValidationError("upload.path must not be empty".to_string()),
        ),
        UploadConfig::Command { program, .. } if program.trim().is_empty() => Err(
            ConfigError::ValidationError("upload.program must not be empty".to_string()),
        ),
        _ => Ok(()),
    }
}

/// Characters tar and shells read as patterns
const GLOB_CHARS: &[char] = &['*', '?', '[', ']'];

fn has_path_separator(value: &str) -> bool {
    value.contains('/') || value.contains('\\')
}
