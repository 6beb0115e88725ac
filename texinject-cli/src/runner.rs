//! Shared setup for commands that touch containers.

use tracing::info;

use texinject::config::ConfigFile;
use texinject::logging::{init_logging, LoggingGuard};

use crate::error::CliError;

/// Loaded configuration plus the active logging guard.
pub struct CliRunner {
    config: ConfigFile,
    logging: LoggingGuard,
}

impl CliRunner {
    /// Load `config.ini` and install logging.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let logging = init_logging(&config.logging.directory, &config.logging.level, verbose)?;
        Ok(Self { config, logging })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log version and command once logging is up.
    pub fn log_startup(&self, command: &str) {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            command,
            log_dir = %self.logging.log_dir().display(),
            "TexInject starting"
        );
    }
}
