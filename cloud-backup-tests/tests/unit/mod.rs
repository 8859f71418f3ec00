//! Unit tests for cloud-backup
//!
//! Naming, layout and configuration checks that need no processes.

mod archive;
mod config;
