//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use texinject::config::ConfigFile;
use texinject::converter::OrbisImageConverter;
use texinject::patcher::OverflowPolicy;
use texinject::staging::{normalize_path, StagingReport};

use crate::error::CliError;

/// Overflow policy selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OverflowArg {
    /// Leave the record untouched when the converted payload is too large
    Reject,
    /// Write only as many bytes as the original slot holds
    Truncate,
}

impl From<OverflowArg> for OverflowPolicy {
    fn from(arg: OverflowArg) -> Self {
        match arg {
            OverflowArg::Reject => OverflowPolicy::Reject,
            OverflowArg::Truncate => OverflowPolicy::Truncate,
        }
    }
}

/// Build the converter from CLI overrides and config.
pub fn resolve_converter(
    cli_executable: Option<PathBuf>,
    cli_launcher: Option<PathBuf>,
    config: &ConfigFile,
) -> OrbisImageConverter {
    // CLI takes precedence, then config
    let executable = cli_executable.unwrap_or_else(|| config.converter.executable.clone());
    let converter =
        OrbisImageConverter::new(executable).with_format_flag(config.converter.format.clone());

    match cli_launcher.or_else(|| config.converter.launcher.clone()) {
        Some(launcher) => converter.with_launcher(launcher),
        None => converter,
    }
}

/// Ask for a line of text. Empty input is rejected by re-prompting.
pub fn prompt_text(prompt: &str) -> Result<String, CliError> {
    let value: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact_text()
        .map_err(|e| CliError::Prompt(e.to_string()))?;
    Ok(value.trim().to_string())
}

/// Ask for a path, cleaning up quotes left by drag-and-drop.
pub fn prompt_path(prompt: &str) -> Result<PathBuf, CliError> {
    prompt_text(prompt).map(|value| normalize_path(&value))
}

/// Use `value` if given, otherwise prompt for it.
pub fn path_or_prompt(value: Option<PathBuf>, prompt: &str) -> Result<PathBuf, CliError> {
    match value {
        Some(path) => Ok(normalize_path(&path.to_string_lossy())),
        None => prompt_path(prompt),
    }
}

/// Format a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Print what staging copied and what it could not find.
pub fn print_staging_report(report: &StagingReport) {
    for file in &report.copied {
        println!(
            "Copied {} -> {} ({})",
            file.from.display(),
            file.to.display(),
            format_size(file.bytes)
        );
    }
    for missing in &report.missing {
        println!("File not found: {}", missing.display());
    }
}

/// Fail early if `path` is not an existing file.
pub fn require_file(path: &Path) -> Result<(), CliError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::SourceNotFound(path.to_path_buf()))
    }
}
