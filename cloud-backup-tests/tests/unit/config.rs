//! Unit tests for configuration loading and validation

use cloud_backup::config::{load_config, ConfigError};
use cloud_backup::databases::Engine;
use cloud_backup::managers::backup::BackupManager;
use cloud_backup::processor::Compression;
use test_utils::{ConfigBuilder, ResultAssertions, TestContext};

#[test]
fn test_config_loading_valid() {
    let builder = ConfigBuilder::new();
    let path = builder.write();

    let config = load_config(&path).assert_ok();
    assert_eq!(config.database.engine, Engine::Mysql);
    assert_eq!(config.processor.compression, Compression::Gzip);
}

#[test]
fn test_config_loading_invalid_toml() {
    let ctx = TestContext::new();
    let path = ctx.create_file("config.toml", "[global\ncache_dir = ");

    assert!(matches!(load_config(&path), Err(ConfigError::ParseError(_))));
}

#[test]
fn test_config_loading_rejects_zero_timeout() {
    let builder = ConfigBuilder::new().with_timeout(Some(0));
    let path = builder.write();

    load_config(&path).assert_err_contains("timeout_seconds");
}

#[test]
fn test_config_loading_rejects_hostname_with_separator() {
    let builder = ConfigBuilder::new().with_hostname("web/01");
    let path = builder.write();

    load_config(&path).assert_err_contains("hostname");
}

#[test]
fn test_plan_from_config_uses_configured_names() {
    let builder = ConfigBuilder::new()
        .with_hostname("web01")
        .with_archive_prefix("nightly-")
        .with_database(Engine::Mongo, "mongodump", &["--out={data_path}"]);
    let cache = builder.cache_dir().to_path_buf();
    let path = builder.write();

    let config = load_config(&path).assert_ok();
    let plan = BackupManager::from_config(&config).plan();

    assert_eq!(plan.job.data_path, cache.join("db").join("mongo"));
    assert_eq!(plan.dump.program, "mongodump");
    assert_eq!(plan.dump.args, vec![format!("--out={}", cache.join("db/mongo").display())]);

    let archive_name = plan
        .archive
        .archive_path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .to_string();
    assert!(archive_name.starts_with("nightly-web01_"));
    assert!(archive_name.ends_with(".tar"));
    assert_eq!(plan.archive.exclude, vec![archive_name]);
    assert_eq!(plan.client, "local");
    assert!(!cache.exists());
}

#[test]
fn test_missing_config_file() {
    let ctx = TestContext::new();
    let missing = ctx.temp_dir().join("nope.toml");

    assert!(!missing.exists());
    assert!(matches!(load_config(&missing), Err(ConfigError::ReadError(_))));
}
