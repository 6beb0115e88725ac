//! Addressable configuration keys for `config get` / `config set`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFile;
use crate::logging::validate_level;

/// A `section.key` setting in `config.ini`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ConverterExecutable,
    ConverterLauncher,
    ConverterFormat,
    PatchOverflowPolicy,
    PatchTempDir,
    PatchArtifactsDir,
    LoggingDirectory,
    LoggingLevel,
}

/// Error from [`ConfigKey::set`] or parsing a key name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigKeyError(pub String);

impl fmt::Display for ConfigKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigKeyError {}

const ALL_KEYS: &[ConfigKey] = &[
    ConfigKey::ConverterExecutable,
    ConfigKey::ConverterLauncher,
    ConfigKey::ConverterFormat,
    ConfigKey::PatchOverflowPolicy,
    ConfigKey::PatchTempDir,
    ConfigKey::PatchArtifactsDir,
    ConfigKey::LoggingDirectory,
    ConfigKey::LoggingLevel,
];

impl ConfigKey {
    /// Every key, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        ALL_KEYS
    }

    /// Full `section.key` name.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ConverterExecutable => "converter.executable",
            ConfigKey::ConverterLauncher => "converter.launcher",
            ConfigKey::ConverterFormat => "converter.format",
            ConfigKey::PatchOverflowPolicy => "patch.overflow_policy",
            ConfigKey::PatchTempDir => "patch.temp_dir",
            ConfigKey::PatchArtifactsDir => "patch.artifacts_dir",
            ConfigKey::LoggingDirectory => "logging.directory",
            ConfigKey::LoggingLevel => "logging.level",
        }
    }

    pub fn section(&self) -> &'static str {
        self.split().0
    }

    pub fn key_name(&self) -> &'static str {
        self.split().1
    }

    fn split(&self) -> (&'static str, &'static str) {
        let name = self.name();
        name.split_once('.').unwrap_or(("", name))
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ConverterExecutable => display_path(&config.converter.executable),
            ConfigKey::ConverterLauncher => display_optional(&config.converter.launcher),
            ConfigKey::ConverterFormat => config.converter.format.clone(),
            ConfigKey::PatchOverflowPolicy => config.patch.overflow_policy.to_string(),
            ConfigKey::PatchTempDir => display_optional(&config.patch.temp_dir),
            ConfigKey::PatchArtifactsDir => display_optional(&config.patch.artifacts_dir),
            ConfigKey::LoggingDirectory => display_path(&config.logging.directory),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
        }
    }

    /// Set from a string. An empty value clears optional keys.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        let value = value.trim();

        match self {
            ConfigKey::ConverterExecutable => {
                config.converter.executable = required_path(self, value)?;
            }
            ConfigKey::ConverterLauncher => config.converter.launcher = optional_path(value),
            ConfigKey::ConverterFormat => {
                config.converter.format = required(self, value)?.to_string();
            }
            ConfigKey::PatchOverflowPolicy => {
                config.patch.overflow_policy = value.parse().map_err(ConfigKeyError)?;
            }
            ConfigKey::PatchTempDir => config.patch.temp_dir = optional_path(value),
            ConfigKey::PatchArtifactsDir => config.patch.artifacts_dir = optional_path(value),
            ConfigKey::LoggingDirectory => {
                config.logging.directory = required_path(self, value)?;
            }
            ConfigKey::LoggingLevel => {
                let level = required(self, value)?;
                validate_level(level).map_err(|e| ConfigKeyError(e.to_string()))?;
                config.logging.level = level.to_string();
            }
        }

        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigKeyError(format!("unknown configuration key '{}'", s)))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn required<'a>(key: &ConfigKey, value: &'a str) -> Result<&'a str, ConfigKeyError> {
    if value.is_empty() {
        Err(ConfigKeyError(format!("{} cannot be empty", key.name())))
    } else {
        Ok(value)
    }
}

fn required_path(key: &ConfigKey, value: &str) -> Result<PathBuf, ConfigKeyError> {
    required(key, value).map(PathBuf::from)
}

fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

fn display_path(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}

fn display_optional(path: &Option<PathBuf>) -> String {
    path.as_deref().map(display_path).unwrap_or_default()
}
