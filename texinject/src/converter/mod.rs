//! External texture compiler boundary.
//!
//! The platform compiler that turns a DDS into a console-native GNF texture
//! is an opaque executable. The patcher only talks to it through the
//! [`TextureConverter`] trait so tests can substitute deterministic stubs.
//!
//! ```text
//! ┌──────────────────────┐      convert(dds)      ┌──────────────────────┐
//! │ InPlaceTexturePatcher│ ─────────────────────► │  TextureConverter    │ (trait)
//! └──────────────────────┘ ◄───────────────────── └──────────┬───────────┘
//!                                gnf path                    │
//!                                                  ┌─────────┴─────────┐
//!                                                  ▼                   ▼
//!                                          ┌──────────────┐    ┌──────────────┐
//!                                          │OrbisImage2Gnf│    │  Test stubs  │
//!                                          └──────────────┘    └──────────────┘
//! ```
//!
//! The only property relied on is that a converted file starts with a
//! [`GNF_HEADER_SIZE`]-byte header followed by the payload. The payload
//! length is *not* assumed to match the original slot.

mod error;
mod orbis;

use std::fs;
use std::path::{Path, PathBuf};

pub use error::ConversionError;
pub use orbis::{OrbisImageConverter, DEFAULT_CONVERTER_EXECUTABLE, DEFAULT_FORMAT_FLAG};

/// Bytes of platform header preceding the payload in converted files.
pub const GNF_HEADER_SIZE: usize = 0x100;

/// Extension given to converted output files.
pub const CONVERTED_EXTENSION: &str = "gnf";

/// Converts a DDS file on disk into a platform-native texture file.
pub trait TextureConverter {
    /// Convert `input` and return the path of the produced file.
    fn convert(&self, input: &Path) -> Result<PathBuf, ConversionError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

impl<T: TextureConverter + ?Sized> TextureConverter for &T {
    fn convert(&self, input: &Path) -> Result<PathBuf, ConversionError> {
        (**self).convert(input)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: TextureConverter + ?Sized> TextureConverter for Box<T> {
    fn convert(&self, input: &Path) -> Result<PathBuf, ConversionError> {
        (**self).convert(input)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Output path used for a given converter input.
pub fn converted_path(input: &Path) -> PathBuf {
    input.with_extension(CONVERTED_EXTENSION)
}

/// Read a converted file and strip its platform header.
pub fn read_converted_payload(path: &Path) -> Result<Vec<u8>, ConversionError> {
    let mut bytes = fs::read(path).map_err(|e| ConversionError::ReadOutput {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes.len() < GNF_HEADER_SIZE {
        return Err(ConversionError::OutputTooShort {
            path: path.to_path_buf(),
            len: bytes.len(),
        });
    }

    bytes.drain(..GNF_HEADER_SIZE);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_converted_path_swaps_extension() {
        assert_eq!(
            converted_path(Path::new("/tmp/image_1f4.dds")),
            PathBuf::from("/tmp/image_1f4.gnf")
        );
    }

    #[test]
    fn test_read_converted_payload_strips_header() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.gnf");
        let mut contents = vec![0xAAu8; GNF_HEADER_SIZE];
        contents.extend_from_slice(&[1, 2, 3]);
        fs::write(&path, contents).unwrap();

        assert_eq!(read_converted_payload(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_read_converted_payload_header_only() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.gnf");
        fs::write(&path, vec![0u8; GNF_HEADER_SIZE]).unwrap();

        assert!(read_converted_payload(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_converted_payload_too_short() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.gnf");
        fs::write(&path, vec![0u8; 10]).unwrap();

        assert!(matches!(
            read_converted_payload(&path),
            Err(ConversionError::OutputTooShort { len: 10, .. })
        ));
    }

    #[test]
    fn test_read_converted_payload_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = read_converted_payload(&temp.path().join("missing.gnf"));
        assert!(matches!(result, Err(ConversionError::ReadOutput { .. })));
    }
}
