//! CLI error type.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use texinject::config::ConfigFileError;
use texinject::logging::LoggingError;
use texinject::patcher::PatchError;
use texinject::scanner::ScanError;
use texinject::staging::StagingError;

/// Errors surfaced to the user by any command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error("File not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Failed to open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("Input aborted: {0}")]
    Prompt(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::SourceNotFound(_) | CliError::Prompt(_) => 2,
            CliError::Config(_) | CliError::ConfigFile(_) => 3,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_not_found_display() {
        let err = CliError::SourceNotFound(PathBuf::from("/games/pakchunk0.ucas"));
        assert_eq!(err.to_string(), "File not found: /games/pakchunk0.ucas");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_patch_error_is_transparent() {
        let err: CliError = PatchError::OpenContainer {
            path: PathBuf::from("a.ucas"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert_eq!(err.to_string(), "failed to open container a.ucas: denied");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_config_exit_code() {
        assert_eq!(CliError::Config("bad".to_string()).exit_code(), 3);
    }
}
