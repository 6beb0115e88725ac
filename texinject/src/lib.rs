//! TexInject - in-place texture injection for packed game assets
//!
//! Finds placeholder textures inside an Unreal asset container, wraps each
//! payload in a DDS file, runs it through the platform texture compiler and
//! writes the compiled payload back over the original bytes. The container
//! is never resized, so no repacking is needed.
//!
//! # Modules
//!
//! - [`scanner`]: heuristic discovery of texture records
//! - [`dds`]: minimal DDS encoding of raw payloads
//! - [`converter`]: boundary to the external texture compiler
//! - [`patcher`]: the scan → encode → convert → overwrite loop
//! - [`staging`]: copying a patched container's companion files
//! - [`config`]: `config.ini` handling
//! - [`logging`]: subscriber setup
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use texinject::config::ConfigFile;
//! use texinject::patcher::InPlaceTexturePatcher;
//!
//! let config = ConfigFile::load().unwrap_or_default();
//! let patcher = InPlaceTexturePatcher::new(config.converter(), config.patcher_config());
//! let report = patcher.patch_file(Path::new("pakchunk99-WindowsNoEditor.ucas")).unwrap();
//! assert_eq!(report.found_count(), report.patched_count() + report.skipped_count());
//! ```

pub mod config;
pub mod converter;
pub mod dds;
pub mod logging;
pub mod patcher;
pub mod scanner;
pub mod staging;
pub mod texture;

#[cfg(test)]
pub(crate) mod testing;
