//! `config.ini` loading and saving.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::converter::{OrbisImageConverter, DEFAULT_CONVERTER_EXECUTABLE, DEFAULT_FORMAT_FLAG};
use crate::patcher::{OverflowPolicy, PatcherConfig};

/// Default log filter when none is configured.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors from reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read { path: PathBuf, source: ini::Error },

    #[error("failed to write config file {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// `[converter]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterSettings {
    /// Path or name of the texture compiler.
    pub executable: PathBuf,
    /// Program used to run the compiler, e.g. `wine`.
    pub launcher: Option<PathBuf>,
    /// Value of the compiler's `-f` flag.
    pub format: String,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_CONVERTER_EXECUTABLE),
            launcher: None,
            format: DEFAULT_FORMAT_FLAG.to_string(),
        }
    }
}

/// `[patch]` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchSettings {
    pub overflow_policy: OverflowPolicy,
    /// Parent of per-record scratch directories.
    pub temp_dir: Option<PathBuf>,
    /// Where to keep each record's DDS and converted file.
    pub artifacts_dir: Option<PathBuf>,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    /// `EnvFilter` directive, e.g. `info` or `texinject=debug`.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_dir(),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Contents of `config.ini`.
///
/// Missing sections and keys take their defaults, so an absent file is the
/// same as an empty one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub converter: ConverterSettings,
    pub patch: PatchSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, returning defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        let write_err = |source| ConfigFileError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)
    }

    /// Build from parsed INI.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigFileError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("converter")) {
            if let Some(v) = non_empty(section.get("executable")) {
                config.converter.executable = PathBuf::from(v);
            }
            config.converter.launcher = non_empty(section.get("launcher")).map(PathBuf::from);
            if let Some(v) = non_empty(section.get("format")) {
                config.converter.format = v.to_string();
            }
        }

        if let Some(section) = ini.section(Some("patch")) {
            if let Some(v) = non_empty(section.get("overflow_policy")) {
                config.patch.overflow_policy =
                    v.parse().map_err(|message| ConfigFileError::InvalidValue {
                        key: "patch.overflow_policy".to_string(),
                        message,
                    })?;
            }
            config.patch.temp_dir = non_empty(section.get("temp_dir")).map(PathBuf::from);
            config.patch.artifacts_dir =
                non_empty(section.get("artifacts_dir")).map(PathBuf::from);
        }

        if let Some(section) = ini.section(Some("logging")) {
            if let Some(v) = non_empty(section.get("directory")) {
                config.logging.directory = PathBuf::from(v);
            }
            if let Some(v) = non_empty(section.get("level")) {
                config.logging.level = v.to_string();
            }
        }

        Ok(config)
    }

    /// Render as INI. Unset optional keys are written empty.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("converter"))
            .set("executable", self.converter.executable.to_string_lossy())
            .set("launcher", optional_path(&self.converter.launcher))
            .set("format", self.converter.format.as_str());

        ini.with_section(Some("patch"))
            .set("overflow_policy", self.patch.overflow_policy.as_str())
            .set("temp_dir", optional_path(&self.patch.temp_dir))
            .set("artifacts_dir", optional_path(&self.patch.artifacts_dir));

        ini.with_section(Some("logging"))
            .set("directory", self.logging.directory.to_string_lossy())
            .set("level", self.logging.level.as_str());

        ini
    }

    /// Converter described by the `[converter]` section.
    pub fn converter(&self) -> OrbisImageConverter {
        let converter = OrbisImageConverter::new(self.converter.executable.clone())
            .with_format_flag(self.converter.format.clone());
        match self.converter.launcher {
            Some(ref launcher) => converter.with_launcher(launcher.clone()),
            None => converter,
        }
    }

    /// Patcher settings described by the `[patch]` section.
    pub fn patcher_config(&self) -> PatcherConfig {
        let mut config = PatcherConfig::new().with_overflow_policy(self.patch.overflow_policy);
        if let Some(ref dir) = self.patch.temp_dir {
            config = config.with_temp_dir(dir.clone());
        }
        if let Some(ref dir) = self.patch.artifacts_dir {
            config = config.with_artifacts_dir(dir.clone());
        }
        config
    }
}

/// `~/.config/texinject` or the platform equivalent.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("texinject")
}

/// Default location of `config.ini`.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.ini")
}

/// Default log directory.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("texinject")
        .join("logs")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn optional_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}
