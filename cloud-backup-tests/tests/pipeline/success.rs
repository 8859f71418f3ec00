//! Successful runs

use cloud_backup::processor::{Compression, FixedClock, StaticHost};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use test_utils::{
    fixed_time, host1_manager, BackupManager, FileDumper, RecordedUpload, RecordingClient,
    TarWritingExecutor, TestContext, HOST1_ARCHIVE,
};

#[test]
fn test_run_uploads_archive_once_and_cleans_up() {
    let ctx = TestContext::new();
    let cache = ctx.cache_dir();
    let client = RecordingClient::new();
    let executor = TarWritingExecutor::new();

    let manager = host1_manager(
        &cache,
        Box::new(FileDumper::mysql()),
        client.clone(),
        executor.clone(),
    );

    assert!(manager.execute());

    assert_eq!(
        client.uploads(),
        vec![RecordedUpload {
            path: cache.join("db").join(HOST1_ARCHIVE),
            existed: true,
        }]
    );
    assert!(!ctx.job_dir().exists());
    assert_eq!(executor.mock().call_count("tar"), 1);
}

#[test]
fn test_run_report() {
    let ctx = TestContext::new();
    let cache = ctx.cache_dir();

    let manager = host1_manager(
        &cache,
        Box::new(FileDumper::mysql()),
        RecordingClient::new(),
        TarWritingExecutor::new(),
    );

    let report = manager.run().unwrap();

    assert_eq!(report.filename, HOST1_ARCHIVE);
    assert_eq!(report.archive_path, cache.join("db").join(HOST1_ARCHIVE));
    assert_eq!(report.archive_size, "placeholder archive".len() as u64);
    assert_eq!(report.client, "recording");
    assert_eq!(report.target, "memory");
}

#[test]
fn test_plan_matches_run_layout() {
    let client = RecordingClient::new();
    let manager = host1_manager(
        std::path::Path::new("/tmp/backup"),
        Box::new(FileDumper::mysql()),
        client.clone(),
        TarWritingExecutor::new(),
    );

    let plan = manager.plan();

    assert_eq!(plan.job.data_path, PathBuf::from("/tmp/backup/db/mysql"));
    assert_eq!(
        plan.archive.archive_path,
        PathBuf::from("/tmp/backup/db/host1_2024_01_02-03_04_05.tar")
    );
    assert_eq!(plan.archive.exclude, vec![HOST1_ARCHIVE.to_string()]);
    assert_eq!(plan.dump.program, "fixture-dump");
    assert_eq!(client.upload_count(), 0);
}

#[test]
fn test_tar_runs_against_job_directory_with_self_exclusion() {
    let ctx = TestContext::new();
    let cache = ctx.cache_dir();
    let executor = TarWritingExecutor::new();

    let manager = host1_manager(
        &cache,
        Box::new(FileDumper::mysql()),
        RecordingClient::new(),
        executor.clone(),
    )
    .with_compression(Compression::Bzip2)
    .with_timeout(Some(Duration::from_secs(30)));

    assert!(manager.execute());

    let calls = executor.mock().calls_to("tar");
    assert_eq!(calls.len(), 1);

    let base = cache.join("db");
    let archive = base.join(HOST1_ARCHIVE);
    assert_eq!(
        calls[0].args,
        vec![
            "--no-wildcards".to_string(),
            format!("--exclude={}", HOST1_ARCHIVE),
            "-cjf".to_string(),
            archive.display().to_string(),
            "-C".to_string(),
            base.display().to_string(),
            ".".to_string(),
        ]
    );
    assert_eq!(calls[0].timeout, Some(Duration::from_secs(30)));
}

#[test]
fn test_run_with_missing_folder_still_succeeds() {
    let ctx = TestContext::new();
    let cache = ctx.cache_dir();
    let client = RecordingClient::new();

    let manager = host1_manager(
        &cache,
        Box::new(FileDumper::mysql()),
        client.clone(),
        TarWritingExecutor::new(),
    )
    .with_folders(vec![ctx.temp_dir().join("not-there")]);

    assert!(manager.execute());
    assert_eq!(client.upload_count(), 1);
}

#[test]
fn test_consecutive_runs_reuse_cache_directory() {
    let ctx = TestContext::new();
    let cache = ctx.cache_dir();
    let client = RecordingClient::new();

    let manager = host1_manager(
        &cache,
        Box::new(FileDumper::mysql()),
        client.clone(),
        TarWritingExecutor::new(),
    );

    assert!(manager.execute());
    assert!(manager.execute());
    assert_eq!(client.upload_count(), 2);
}

#[test]
fn test_prefix_and_hostname_shape_archive_name() {
    let ctx = TestContext::new();
    let cache = ctx.cache_dir();
    let client = RecordingClient::new();

    let manager = BackupManager::new(&cache, Box::new(FileDumper::mysql()), Box::new(client.clone()))
        .with_executor(Arc::new(TarWritingExecutor::new()))
        .with_clock(Arc::new(FixedClock(fixed_time())))
        .with_host(Arc::new(StaticHost("web 01".to_string())))
        .with_archive_prefix("nightly-");

    assert!(manager.execute());

    let uploads = client.uploads();
    assert_eq!(
        uploads[0].path.file_name().unwrap().to_string_lossy(),
        "nightly-web_01_2024_01_02-03_04_05.tar"
    );
}
