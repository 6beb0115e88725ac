//! Configuration for the in-place patcher.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::scanner::DEFAULT_WINDOW_SIZE;

/// What to do when a converted payload is larger than the slot it replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Leave the record untouched and report it as skipped.
    #[default]
    Reject,
    /// Write only as many bytes as the slot holds.
    Truncate,
}

impl OverflowPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverflowPolicy::Reject => "reject",
            OverflowPolicy::Truncate => "truncate",
        }
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(OverflowPolicy::Reject),
            "truncate" => Ok(OverflowPolicy::Truncate),
            other => Err(format!(
                "unknown overflow policy '{}' (expected reject or truncate)",
                other
            )),
        }
    }
}

/// Configuration for [`InPlaceTexturePatcher`](super::InPlaceTexturePatcher).
#[derive(Debug, Clone)]
pub struct PatcherConfig {
    /// Handling of converted payloads larger than their slot.
    pub overflow_policy: OverflowPolicy,

    /// Parent directory for per-record scratch directories.
    ///
    /// `None` uses the system temporary directory.
    pub temp_dir: Option<PathBuf>,

    /// Directory to copy each record's DDS and converted file into before
    /// the scratch directory is removed.
    pub artifacts_dir: Option<PathBuf>,

    /// Scan and report records without converting or writing.
    pub dry_run: bool,

    /// Scanner read window size in bytes.
    pub window_size: usize,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            overflow_policy: OverflowPolicy::default(),
            temp_dir: None,
            artifacts_dir: None,
            dry_run: false,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl PatcherConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overflow policy.
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Set the scratch directory parent.
    pub fn with_temp_dir(mut self, path: PathBuf) -> Self {
        self.temp_dir = Some(path);
        self
    }

    /// Keep conversion artifacts in `path`.
    pub fn with_artifacts_dir(mut self, path: PathBuf) -> Self {
        self.artifacts_dir = Some(path);
        self
    }

    /// Enable or disable dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the scanner read window size.
    pub fn with_window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }
}
