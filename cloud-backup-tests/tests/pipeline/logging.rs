//! Log events emitted by runs

use tracing::Level;
use test_utils::{
    host1_manager, FailingDumper, FileDumper, LogCapture, MockExecutor, RecordingClient, TarWritingExecutor,
    TestContext, FAILURE_MESSAGE,
};

#[test]
fn test_failed_run_logs_one_critical_error() {
    let ctx = TestContext::new();
    let capture = LogCapture::new();

    let manager = host1_manager(
        &ctx.cache_dir(),
        Box::new(FailingDumper::new("Access denied")),
        RecordingClient::new(),
        TarWritingExecutor::new(),
    );

    let succeeded = capture.capture(|| manager.execute());

    assert!(!succeeded);
    let errors = capture.at_level(Level::ERROR);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.starts_with(FAILURE_MESSAGE));
    assert!(errors[0].message.contains("Access denied"));
    assert_eq!(errors[0].field("severity"), Some("critical"));
    assert_eq!(errors[0].field("stage"), Some("dump"));
}

#[test]
fn test_upload_failure_logs_one_critical_error() {
    let ctx = TestContext::new();
    let capture = LogCapture::new();

    let manager = host1_manager(
        &ctx.cache_dir(),
        Box::new(FileDumper::mysql()),
        RecordingClient::failing("bucket unreachable"),
        TarWritingExecutor::new(),
    );

    assert!(!capture.capture(|| manager.execute()));

    let errors = capture.at_level(Level::ERROR);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("stage"), Some("upload"));
}

#[test]
fn test_successful_run_logs_no_error() {
    let ctx = TestContext::new();
    let capture = LogCapture::new();

    let manager = host1_manager(
        &ctx.cache_dir(),
        Box::new(FileDumper::mysql()),
        RecordingClient::new(),
        TarWritingExecutor::new(),
    );

    assert!(capture.capture(|| manager.execute()));
    assert_eq!(capture.count(Level::ERROR), 0);
    assert!(capture.count(Level::INFO) > 0);
}

#[test]
fn test_unreadable_archive_size_is_logged() {
    let ctx = TestContext::new();
    let capture = LogCapture::new();

    // tar reports success without writing the archive
    let manager = host1_manager(
        &ctx.cache_dir(),
        Box::new(FileDumper::mysql()),
        RecordingClient::new(),
        MockExecutor::new(),
    );

    let report = capture.capture(|| manager.run()).unwrap();

    assert_eq!(report.archive_size, 0);
    let warnings = capture.at_level(Level::WARN);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("Failed to read archive size"));
    assert_eq!(capture.count(Level::ERROR), 0);
}
