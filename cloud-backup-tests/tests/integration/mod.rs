//! Integration tests for cloud-backup
//!
//! These tests run real processes (`tar`, `sh`, `cp`) and skip themselves
//! when `tar` is not installed.

#[cfg(unix)]
mod archive;

/// Whether the external tools the pipeline needs are available
pub fn tools_available() -> bool {
    let available = which::which("tar").is_ok() && which::which("sh").is_ok();
    if !available {
        eprintln!("tar or sh not found in PATH, skipping");
    }
    available
}
