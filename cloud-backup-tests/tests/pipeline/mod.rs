//! Pipeline tests for cloud-backup
//!
//! These tests drive `BackupManager` end to end with fixture dumpers,
//! recording upload clients and an executor that fakes `tar`.

mod failures;
mod logging;
mod success;
