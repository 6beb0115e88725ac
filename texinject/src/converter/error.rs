//! Error types for texture conversion.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors raised by a [`TextureConverter`](super::TextureConverter).
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The converter executable could not be started.
    #[error("failed to run {}: {source}", executable.display())]
    Spawn {
        executable: PathBuf,
        source: io::Error,
    },

    /// The converter ran but exited unsuccessfully.
    #[error("conversion of {} failed ({status}): {}", input.display(), stderr.trim())]
    Failed {
        input: PathBuf,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },

    /// The converter reported success but produced no output file.
    #[error("converter produced no output at {}", path.display())]
    MissingOutput { path: PathBuf },

    /// The converted file could not be read.
    #[error("failed to read converted file {}: {source}", path.display())]
    ReadOutput { path: PathBuf, source: io::Error },

    /// The converted file is smaller than its platform header.
    #[error("converted file {} is only {len} bytes", path.display())]
    OutputTooShort { path: PathBuf, len: usize },
}

impl ConversionError {
    /// Captured diagnostic output, when the converter ran.
    pub fn diagnostics(&self) -> Option<(&str, &str)> {
        match self {
            ConversionError::Failed { stdout, stderr, .. } => Some((stdout, stderr)),
            _ => None,
        }
    }
}
