//! Shell-based converter using the `orbis-image2gnf` tool.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::{converted_path, ConversionError, TextureConverter};

/// Executable name used when none is configured.
pub const DEFAULT_CONVERTER_EXECUTABLE: &str = "orbis-image2gnf.exe";

/// Input format flag passed to the converter; `auto` lets it detect DDS.
pub const DEFAULT_FORMAT_FLAG: &str = "auto";

/// Runs `orbis-image2gnf -f <format> -i <input> -o <output>` synchronously.
///
/// The tool is a Windows binary, so an optional launcher (for example
/// `wine`) can be placed in front of it.
///
/// # Example
///
/// ```
/// use texinject::converter::{OrbisImageConverter, TextureConverter};
///
/// let converter = OrbisImageConverter::new("orbis-image2gnf.exe")
///     .with_launcher("wine");
/// assert_eq!(converter.name(), "orbis-image2gnf");
/// ```
#[derive(Debug, Clone)]
pub struct OrbisImageConverter {
    executable: PathBuf,
    launcher: Option<PathBuf>,
    format_flag: String,
}

impl Default for OrbisImageConverter {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERTER_EXECUTABLE)
    }
}

impl OrbisImageConverter {
    /// Create a converter invoking `executable`.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            launcher: None,
            format_flag: DEFAULT_FORMAT_FLAG.to_string(),
        }
    }

    /// Run the executable through `launcher`.
    pub fn with_launcher(mut self, launcher: impl Into<PathBuf>) -> Self {
        self.launcher = Some(launcher.into());
        self
    }

    /// Override the `-f` input format flag.
    pub fn with_format_flag(mut self, flag: impl Into<String>) -> Self {
        self.format_flag = flag.into();
        self
    }

    /// Path of the converter executable.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Launcher, if any.
    pub fn launcher(&self) -> Option<&Path> {
        self.launcher.as_deref()
    }

    /// Arguments passed after the program name.
    fn arguments(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args = Vec::with_capacity(7);
        if self.launcher.is_some() {
            args.push(self.executable.clone().into_os_string());
        }
        args.push("-f".into());
        args.push(self.format_flag.clone().into());
        args.push("-i".into());
        args.push(input.as_os_str().to_owned());
        args.push("-o".into());
        args.push(output.as_os_str().to_owned());
        args
    }

    fn program(&self) -> &Path {
        self.launcher.as_deref().unwrap_or(&self.executable)
    }
}

impl TextureConverter for OrbisImageConverter {
    fn convert(&self, input: &Path) -> Result<PathBuf, ConversionError> {
        let output_path = converted_path(input);
        let args = self.arguments(input, &output_path);

        debug!(
            program = %self.program().display(),
            args = ?args,
            "Running texture converter"
        );

        let output = Command::new(self.program())
            .args(&args)
            .output()
            .map_err(|e| ConversionError::Spawn {
                executable: self.program().to_path_buf(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        debug!(stdout = %stdout.trim(), stderr = %stderr.trim(), "Converter output");

        if !output.status.success() {
            return Err(ConversionError::Failed {
                input: input.to_path_buf(),
                status: output.status,
                stdout,
                stderr,
            });
        }

        if !output_path.is_file() {
            return Err(ConversionError::MissingOutput { path: output_path });
        }

        Ok(output_path)
    }

    fn name(&self) -> &str {
        "orbis-image2gnf"
    }
}
