//! Companion-file staging.
//!
//! An Unreal IoStore container is split across sibling files sharing one
//! stem (`.ucas` data, `.utoc` table of contents, `.pak` stub). After the
//! data file has been patched, the set is copied into a mod directory under
//! a new name. A plain `.pak` source has no siblings.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

/// Extensions copied for an IoStore source.
pub const IOSTORE_EXTENSIONS: &[&str] = &["ucas", "utoc", "pak"];

/// Extensions copied for a standalone `.pak` source.
pub const PAK_EXTENSIONS: &[&str] = &["pak"];

/// Errors raised while staging companion files.
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("source file has no file name: {}", .0.display())]
    InvalidSource(PathBuf),

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

/// A file copied into the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub from: PathBuf,
    pub to: PathBuf,
    pub bytes: u64,
}

/// What happened during staging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagingReport {
    pub copied: Vec<StagedFile>,
    /// Expected siblings that did not exist.
    pub missing: Vec<PathBuf>,
}

/// Extensions to copy for `source`.
pub fn companion_extensions(source: &Path) -> &'static [&'static str] {
    let is_pak = source
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pak"))
        .unwrap_or(false);

    if is_pak {
        PAK_EXTENSIONS
    } else {
        IOSTORE_EXTENSIONS
    }
}

/// Copy `source` and its siblings to `<dest_dir>/<prefix>.<ext>`.
///
/// Missing siblings are recorded in the report and skipped. `dest_dir` is
/// created if it does not exist.
pub fn stage_companion_files(
    source: &Path,
    dest_dir: &Path,
    prefix: &str,
) -> Result<StagingReport, StagingError> {
    let stem = source
        .file_stem()
        .ok_or_else(|| StagingError::InvalidSource(source.to_path_buf()))?;
    let source_dir = source.parent().unwrap_or_else(|| Path::new(""));

    fs::create_dir_all(dest_dir).map_err(|e| StagingError::CreateDir {
        path: dest_dir.to_path_buf(),
        source: e,
    })?;

    let mut report = StagingReport::default();

    for ext in companion_extensions(source) {
        let mut name = stem.to_os_string();
        name.push(".");
        name.push(ext);
        let from = source_dir.join(name);
        if !from.is_file() {
            warn!(path = %from.display(), "Companion file not found");
            report.missing.push(from);
            continue;
        }

        let to = dest_dir.join(format!("{}.{}", prefix, ext));
        let bytes = fs::copy(&from, &to).map_err(|e| StagingError::Copy {
            from: from.clone(),
            to: to.clone(),
            source: e,
        })?;

        info!(from = %from.display(), to = %to.display(), bytes, "Copied companion file");
        report.copied.push(StagedFile { from, to, bytes });
    }

    Ok(report)
}

/// Clean up a user-entered path.
///
/// Strips surrounding whitespace and one layer of matching quotes (as left
/// by drag-and-drop into a terminal), then drops `.` components and folds
/// `..` into the preceding component where there is one.
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use texinject::staging::normalize_path;
///
/// assert_eq!(
///     normalize_path("  \"/games/./Paks/../Paks/pakchunk0.ucas\" "),
///     PathBuf::from("/games/Paks/pakchunk0.ucas")
/// );
/// ```
pub fn normalize_path(input: &str) -> PathBuf {
    let trimmed = strip_quotes(input.trim()).trim();

    let mut out = PathBuf::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }

    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

fn strip_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}
