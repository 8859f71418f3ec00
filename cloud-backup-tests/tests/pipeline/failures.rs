//! Runs stopping at a failing stage

use cloud_backup::utils::locker;
use std::fs;
use test_utils::{
    host1_manager, BackupError, FailingDumper, FileDumper, MockExecutor, MockResponse,
    RecordingClient, Stage, TarWritingExecutor, TestContext, HOST1_ARCHIVE,
};

#[test]
fn test_dump_failure_stops_before_archive() {
    let ctx = TestContext::new();
    let cache = ctx.cache_dir();
    let client = RecordingClient::new();
    let executor = TarWritingExecutor::new();

    let manager = host1_manager(
        &cache,
        Box::new(FailingDumper::new("Access denied for user 'backup'")),
        client.clone(),
        executor.clone(),
    );

    let err = manager.run().unwrap_err();

    assert_eq!(err.stage, Stage::Dump);
    assert!(err.to_string().contains("Access denied"));
    assert!(!executor.mock().was_called("tar"));
    assert!(!cache.join("db").join(HOST1_ARCHIVE).exists());
    assert_eq!(client.upload_count(), 0);
}

#[test]
fn test_dump_failure_execute_returns_false() {
    let ctx = TestContext::new();
    let manager = host1_manager(
        &ctx.cache_dir(),
        Box::new(FailingDumper::new("boom")),
        RecordingClient::new(),
        TarWritingExecutor::new(),
    );

    assert!(!manager.execute());
}

#[test]
fn test_compress_failure_keeps_dump() {
    let ctx = TestContext::new();
    let cache = ctx.cache_dir();
    let client = RecordingClient::new();
    let executor =
        TarWritingExecutor::from_mock(MockExecutor::new().fail("tar", "No space left on device"));

    let manager = host1_manager(&cache, Box::new(FileDumper::mysql()), client.clone(), executor);

    let err = manager.run().unwrap_err();

    assert_eq!(err.stage, Stage::Compress);
    assert!(err.to_string().contains("No space left on device"));
    assert!(cache.join("db/mysql/all.sql").is_file());
    assert_eq!(client.upload_count(), 0);
}

#[test]
fn test_compress_timeout() {
    let ctx = TestContext::new();
    let executor =
        TarWritingExecutor::from_mock(MockExecutor::new().expect("tar", MockResponse::Timeout));

    let manager = host1_manager(
        &ctx.cache_dir(),
        Box::new(FileDumper::mysql()),
        RecordingClient::new(),
        executor,
    );

    let err = manager.run().unwrap_err();

    assert_eq!(err.stage, Stage::Compress);
    assert!(err.to_string().contains("timed out"));
}

#[test]
fn test_upload_failure_keeps_archive() {
    let ctx = TestContext::new();
    let cache = ctx.cache_dir();
    let client = RecordingClient::failing("bucket unreachable");

    let manager = host1_manager(
        &cache,
        Box::new(FileDumper::mysql()),
        client.clone(),
        TarWritingExecutor::new(),
    );

    let err = manager.run().unwrap_err();

    assert_eq!(err.stage, Stage::Upload);
    assert!(matches!(err.source, BackupError::Upload { ref client, .. } if client == "recording"));
    assert!(err.to_string().contains("bucket unreachable"));
    assert_eq!(client.upload_count(), 1);
    assert!(client.uploads()[0].existed);
    assert!(cache.join("db").join(HOST1_ARCHIVE).is_file());
}

#[test]
fn test_upload_failure_keeps_folder_copies() {
    let ctx = TestContext::new();
    let cache = ctx.cache_dir();
    let folder = ctx.create_folder("uploads", &[("avatar.png", "png"), ("docs/readme.txt", "hi")]);

    let manager = host1_manager(
        &cache,
        Box::new(FileDumper::mysql()),
        RecordingClient::failing("offline"),
        TarWritingExecutor::new(),
    )
    .with_folders(vec![folder]);

    assert!(!manager.execute());

    let copies = cache.join("db/folders/uploads");
    assert_eq!(fs::read_to_string(copies.join("avatar.png")).unwrap(), "png");
    assert_eq!(fs::read_to_string(copies.join("docs/readme.txt")).unwrap(), "hi");
}

#[test]
fn test_held_lock_rejects_run() {
    let ctx = TestContext::new();
    let cache = ctx.cache_dir();
    let client = RecordingClient::new();

    let manager = host1_manager(
        &cache,
        Box::new(FileDumper::mysql()),
        client.clone(),
        TarWritingExecutor::new(),
    );

    let result = locker::hold(&locker::lock_path(&cache), || manager.run()).unwrap();
    let err = result.unwrap_err();

    assert_eq!(err.stage, Stage::Lock);
    assert!(!ctx.job_dir().exists());
    assert_eq!(client.upload_count(), 0);
}

#[test]
fn test_lock_disabled_ignores_holder() {
    let ctx = TestContext::new();
    let cache = ctx.cache_dir();

    let manager = host1_manager(
        &cache,
        Box::new(FileDumper::mysql()),
        RecordingClient::new(),
        TarWritingExecutor::new(),
    )
    .with_lock(false);

    let result = locker::hold(&locker::lock_path(&cache), || manager.run()).unwrap();
    assert!(result.is_ok());
}
