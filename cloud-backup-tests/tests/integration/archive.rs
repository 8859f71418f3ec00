//! Archives produced by the real tar

use super::tools_available;
use cloud_backup::utils::RealExecutor;
use std::fs;
use test_utils::{
    archive_entries, archive_file, host1_manager, FileDumper, RecordingClient, Stage, TestContext,
    HOST1_ARCHIVE,
};

#[test]
fn test_archive_contains_dump_and_folders_but_not_itself() {
    if !tools_available() {
        return;
    }

    let ctx = TestContext::new();
    let cache = ctx.cache_dir();
    let folder = ctx.create_folder("uploads", &[("a.txt", "alpha"), ("nested/b.txt", "beta")]);

    // A failing upload keeps the archive around for inspection
    let manager = host1_manager(
        &cache,
        Box::new(FileDumper::mysql()),
        RecordingClient::failing("keep archive"),
        RealExecutor::new(),
    )
    .with_folders(vec![folder]);

    let err = manager.run().unwrap_err();
    assert_eq!(err.stage, Stage::Upload);

    let archive = cache.join("db").join(HOST1_ARCHIVE);
    let entries = archive_entries(&archive).unwrap();

    assert!(
        !entries.iter().any(|entry| entry.ends_with(HOST1_ARCHIVE)),
        "archive contains itself: {:?}",
        entries
    );
    assert!(entries.contains(&"mysql/all.sql".to_string()));
    assert!(entries.contains(&"folders/uploads/a.txt".to_string()));
    assert!(entries.contains(&"folders/uploads/nested/b.txt".to_string()));
    assert_eq!(
        archive_file(&archive, "mysql/all.sql").unwrap(),
        "CREATE TABLE users (id INT);\n"
    );
}

#[test]
fn test_successful_run_uploads_existing_archive() {
    if !tools_available() {
        return;
    }

    let ctx = TestContext::new();
    let cache = ctx.cache_dir();
    let client = RecordingClient::new();

    let manager = host1_manager(
        &cache,
        Box::new(FileDumper::mysql()),
        client.clone(),
        RealExecutor::new(),
    );

    let report = manager.run().unwrap();

    assert!(report.archive_size > 0);
    let uploads = client.uploads();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].existed);
    assert!(!ctx.job_dir().exists());
}

#[test]
fn test_leftovers_from_failed_run_are_archived() {
    if !tools_available() {
        return;
    }

    let ctx = TestContext::new();
    let cache = ctx.cache_dir();
    fs::create_dir_all(cache.join("db")).unwrap();
    fs::write(cache.join("db/stale.txt"), "from an earlier run").unwrap();

    let manager = host1_manager(
        &cache,
        Box::new(FileDumper::mysql()),
        RecordingClient::failing("keep archive"),
        RealExecutor::new(),
    );

    assert!(!manager.execute());

    let entries = archive_entries(&cache.join("db").join(HOST1_ARCHIVE)).unwrap();
    assert!(entries.contains(&"stale.txt".to_string()));
}

#[test]
fn test_archive_with_bracketed_prefix_does_not_contain_itself() {
    if !tools_available() {
        return;
    }

    let ctx = TestContext::new();
    let cache = ctx.cache_dir();
    let filename = format!("nightly[1]-{}", HOST1_ARCHIVE);

    let manager = host1_manager(
        &cache,
        Box::new(FileDumper::mysql()),
        RecordingClient::failing("keep archive"),
        RealExecutor::new(),
    )
    .with_archive_prefix("nightly[1]-");

    assert!(!manager.execute());

    let entries = archive_entries(&cache.join("db").join(&filename)).unwrap();
    assert_eq!(entries, vec!["mysql".to_string(), "mysql/all.sql".to_string()]);
}
