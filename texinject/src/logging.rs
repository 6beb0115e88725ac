//! Logging setup.
//!
//! Installs a `tracing` subscriber with two outputs:
//!
//! - stderr, with ANSI colours, for interactive use
//! - a daily-rotated file under the configured log directory, written from
//!   a background thread
//!
//! The filter comes from `RUST_LOG` when set, otherwise from the configured
//! level. The returned [`LoggingGuard`] flushes the file writer when dropped
//! and must be held until the program exits.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use time::macros::format_description;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log file name prefix; the appender adds the date.
pub const LOG_FILE_NAME: &str = "texinject.log";

/// Errors from [`init_logging`].
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("invalid log filter '{directive}': {message}")]
    Filter { directive: String, message: String },

    #[error("failed to install log subscriber: {0}")]
    Init(String),
}

/// Keeps the background log writer alive.
pub struct LoggingGuard {
    _file: WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    /// Directory receiving log files.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Filter directive used when `RUST_LOG` is unset.
pub fn filter_directive(level: &str, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        level.trim().to_string()
    }
}

/// Check that `level` parses as a filter directive.
pub fn validate_level(level: &str) -> Result<(), LoggingError> {
    let directive = level.trim();
    EnvFilter::try_new(directive)
        .map(|_| ())
        .map_err(|e| LoggingError::Filter {
            directive: directive.to_string(),
            message: e.to_string(),
        })
}

fn build_filter(level: &str, verbose: bool) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let directive = filter_directive(level, verbose);
    EnvFilter::try_new(&directive).map_err(|e| LoggingError::Filter {
        directive,
        message: e.to_string(),
    })
}

/// Install the global subscriber.
pub fn init_logging(log_dir: &Path, level: &str, verbose: bool) -> Result<LoggingGuard, LoggingError> {
    fs::create_dir_all(log_dir).map_err(|source| LoggingError::CreateDir {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let filter = build_filter(level, verbose)?;

    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(
        offset,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"),
    );

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (file_writer, file_guard) = tracing_appender::non_blocking(appender);

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_timer(timer.clone());

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_timer(timer);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(LoggingGuard {
        _file: file_guard,
        log_dir: log_dir.to_path_buf(),
    })
}
