//! `config` subcommands: inspect and edit `config.ini`.
//!
//! Values are checked before anything is written. Overflow policies and log
//! filters must parse, and path settings are cleaned up the same way as
//! prompted paths. A rejected value leaves the file as it was.

use std::path::Path;

use clap::Subcommand;
use console::style;
use texinject::config::{config_file_path, ConfigFile, ConfigFileError, ConfigKey};
use texinject::staging::normalize_path;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective value of a setting
    Get {
        /// Setting name, e.g. patch.overflow_policy
        key: String,
    },

    /// Change a setting (an empty value clears launcher and directory settings)
    Set {
        /// Setting name, e.g. converter.launcher
        key: String,

        /// New value
        value: String,
    },

    /// Show every setting, marking those left at their default
    List,

    /// Print where config.ini lives
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    let path = config_file_path();

    match command {
        ConfigCommands::Get { key } => {
            let key = lookup(&key)?;
            let config = ConfigFile::load_from(&path)?;
            println!("{}", display_value(&key.get(&config)));
        }
        ConfigCommands::Set { key, value } => {
            let change = apply_setting(&path, &key, &value)?;
            println!(
                "{} = {}",
                style(change.key).bold(),
                display_value(&change.value)
            );
            if let Some(note) = change.note {
                println!("{} {}", style("note:").yellow(), note);
            }
        }
        ConfigCommands::List => {
            let config = ConfigFile::load_from(&path)?;
            println!("{}", style(path.display()).dim());
            println!();
            println!("{}", describe(&config));
        }
        ConfigCommands::Path => println!("{}", path.display()),
    }

    Ok(())
}

/// A setting accepted by `config set`.
#[derive(Debug)]
struct SettingChange {
    key: ConfigKey,
    /// Value as stored.
    value: String,
    /// Accepted, but probably not usable yet.
    note: Option<String>,
}

fn lookup(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        let known: Vec<&str> = ConfigKey::all().iter().map(ConfigKey::name).collect();
        CliError::Config(format!(
            "no setting named '{}' (known: {})",
            key.trim(),
            known.join(", ")
        ))
    })
}

/// Validate `raw` and store it under `key` in the file at `path`.
fn apply_setting(path: &Path, key: &str, raw: &str) -> Result<SettingChange, CliError> {
    let key = lookup(key)?;
    let value = normalize_value(key, raw);

    let mut config = ConfigFile::load_from(path)?;
    key.set(&mut config, &value)
        .map_err(|e| ConfigFileError::InvalidValue {
            key: key.name().to_string(),
            message: e.to_string(),
        })?;
    config.save_to(path)?;

    Ok(SettingChange {
        key,
        value: key.get(&config),
        note: path_note(key, &config),
    })
}

fn is_path_key(key: ConfigKey) -> bool {
    matches!(
        key,
        ConfigKey::ConverterExecutable
            | ConfigKey::ConverterLauncher
            | ConfigKey::PatchTempDir
            | ConfigKey::PatchArtifactsDir
            | ConfigKey::LoggingDirectory
    )
}

/// Strip quotes and fold `.`/`..` in path settings; trim everything else.
fn normalize_value(key: ConfigKey, raw: &str) -> String {
    let trimmed = raw.trim();
    if is_path_key(key) && !trimmed.is_empty() {
        normalize_path(trimmed).to_string_lossy().into_owned()
    } else {
        trimmed.to_string()
    }
}

fn path_note(key: ConfigKey, config: &ConfigFile) -> Option<String> {
    match key {
        ConfigKey::PatchTempDir => config
            .patch
            .temp_dir
            .as_deref()
            .filter(|dir| !dir.is_dir())
            .map(|dir| {
                format!(
                    "{} does not exist; scratch directories are only created inside an existing directory",
                    dir.display()
                )
            }),
        ConfigKey::ConverterExecutable => {
            let exe = &config.converter.executable;
            (exe.components().count() > 1 && !exe.is_file()).then(|| {
                format!(
                    "{} not found; a bare program name is looked up on PATH instead",
                    exe.display()
                )
            })
        }
        _ => None,
    }
}

/// Every setting grouped by section, defaults marked.
fn describe(config: &ConfigFile) -> String {
    let defaults = ConfigFile::default();
    let mut lines = Vec::new();
    let mut section = "";

    for key in ConfigKey::all() {
        if key.section() != section {
            if !section.is_empty() {
                lines.push(String::new());
            }
            section = key.section();
            lines.push(format!("[{}]", section));
        }

        let value = key.get(config);
        let marker = if value == key.get(&defaults) {
            "  (default)"
        } else {
            ""
        };
        lines.push(format!(
            "  {:<16} {}{}",
            key.key_name(),
            display_value(&value),
            marker
        ));
    }

    lines.join("\n")
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}
