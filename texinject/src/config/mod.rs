//! Persistent user configuration.
//!
//! Settings live in an INI file under the platform config directory
//! (`~/.config/texinject/config.ini` on Linux):
//!
//! ```ini
//! [converter]
//! executable = orbis-image2gnf.exe
//! launcher =
//! format = auto
//!
//! [patch]
//! overflow_policy = reject
//! temp_dir =
//! artifacts_dir =
//!
//! [logging]
//! directory = /home/user/.local/share/texinject/logs
//! level = info
//! ```
//!
//! Command-line flags take precedence over values read here.

mod file;
mod keys;

pub use file::{
    config_dir, config_file_path, default_log_dir, ConfigFile, ConfigFileError,
    ConverterSettings, LoggingSettings, PatchSettings, DEFAULT_LOG_LEVEL,
};
pub use keys::{ConfigKey, ConfigKeyError};
