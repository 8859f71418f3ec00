//! Shared steps of every backup run: directory layout, folder copy, compression, cleanup

pub mod archive;
pub mod folders;
pub mod job;

pub use archive::{
    ArchiveDescriptor, ArchiveRequest, Clock, Compression, Compressor, FixedClock, HostIdentity,
    StaticHost, SystemClock, SystemHost,
};
pub use folders::copy_folders;
pub use job::BackupJob;
