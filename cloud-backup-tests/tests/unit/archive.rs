//! Tests for archive naming and the tar invocation

use cloud_backup::processor::{ArchiveDescriptor, ArchiveRequest, BackupJob, Compression};
use rstest::rstest;
use std::path::{Path, PathBuf};
use test_utils::{fixed_time, HOST1_ARCHIVE};

#[test]
fn test_archive_name_for_host1() {
    let descriptor = ArchiveDescriptor::new("", "host1", fixed_time());
    assert_eq!(descriptor.filename, HOST1_ARCHIVE);
}

#[rstest]
#[case("", "web01", "web01_2024_01_02-03_04_05.tar")]
#[case("nightly-", "web01", "nightly-web01_2024_01_02-03_04_05.tar")]
#[case("", "db/primary", "db_primary_2024_01_02-03_04_05.tar")]
#[case("", "  ", "localhost_2024_01_02-03_04_05.tar")]
fn test_archive_names(#[case] prefix: &str, #[case] host: &str, #[case] expected: &str) {
    assert_eq!(ArchiveDescriptor::new(prefix, host, fixed_time()).filename, expected);
}

#[test]
fn test_archive_lands_in_job_base_path() {
    let job = BackupJob::layout(Path::new("/tmp/backup"), "mysql");
    let request = ArchiveRequest::self_excluding(&job.base_path, HOST1_ARCHIVE, Compression::Gzip);

    assert_eq!(
        request.archive_path,
        PathBuf::from("/tmp/backup/db/host1_2024_01_02-03_04_05.tar")
    );
}

#[test]
fn test_tar_command_excludes_archive_itself() {
    let request =
        ArchiveRequest::self_excluding(Path::new("/tmp/backup/db"), HOST1_ARCHIVE, Compression::Gzip);
    let command = request.to_command();

    assert_eq!(command.program, "tar");
    assert_eq!(
        command.args,
        vec![
            "--no-wildcards",
            "--exclude=host1_2024_01_02-03_04_05.tar",
            "-czf",
            "/tmp/backup/db/host1_2024_01_02-03_04_05.tar",
            "-C",
            "/tmp/backup/db",
            ".",
        ]
    );
}

#[rstest]
#[case(Compression::Gzip, "-czf")]
#[case(Compression::Bzip2, "-cjf")]
#[case(Compression::None, "-cf")]
fn test_tar_flags(#[case] compression: Compression, #[case] flag: &str) {
    let command = ArchiveRequest::self_excluding(Path::new("/c/db"), "a.tar", compression).to_command();
    assert!(command.args.iter().any(|arg| arg == flag));
}
