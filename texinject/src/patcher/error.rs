//! Fatal patcher errors.
//!
//! Per-record problems (conversion failures, oversize payloads) are not
//! errors; they are reported as [`SkipReason`](super::SkipReason)s and the
//! run continues.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::dds::DdsError;
use crate::scanner::ScanError;

/// Result type for patcher operations.
pub type PatchResult<T> = Result<T, PatchError>;

/// Errors that abort a patch run.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The container could not be opened for read-write access.
    #[error("failed to open container {}: {source}", path.display())]
    OpenContainer { path: PathBuf, source: io::Error },

    /// Reading from the container failed.
    #[error("failed to read container at 0x{offset:x}: {source}")]
    Read { offset: u64, source: io::Error },

    /// Writing to the container failed.
    #[error("failed to write container at 0x{offset:x}: {source}")]
    Write { offset: u64, source: io::Error },

    /// Flushing the container to disk failed.
    #[error("failed to sync container {}: {source}", path.display())]
    Sync { path: PathBuf, source: io::Error },

    /// Scanning failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A scratch directory or artifact could not be created.
    #[error("failed to prepare {}: {source}", path.display())]
    Scratch { path: PathBuf, source: io::Error },

    /// Writing the temporary DDS failed.
    #[error("failed to encode DDS: {0}")]
    Encode(#[from] DdsError),
}
