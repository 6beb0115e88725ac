//! Wrapping raw pixel payloads in a DDS container.

use std::fs;
use std::path::Path;

use thiserror::Error;

use super::header::{DdsHeader, DDS_FILE_HEADER_LEN};
use crate::texture::TextureFormat;

/// Result type for DDS encoding.
pub type DdsResult<T> = Result<T, DdsError>;

/// Errors raised while building a DDS file.
#[derive(Debug, Error)]
pub enum DdsError {
    /// Width or height is zero.
    #[error("Invalid dimensions {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The dimensions have no representable payload size or row pitch.
    #[error("Dimensions {width}×{height} are too large for a {format} DDS file")]
    DimensionsTooLarge {
        width: u32,
        height: u32,
        format: TextureFormat,
    },

    /// Pixel buffer does not match the size implied by the dimensions.
    #[error("Pixel payload is {actual} bytes, expected {expected} for {width}×{height} {format}")]
    PayloadSizeMismatch {
        width: u32,
        height: u32,
        format: TextureFormat,
        expected: u64,
        actual: u64,
    },

    /// Writing the DDS file failed.
    #[error("Failed to write DDS file: {0}")]
    Io(#[from] std::io::Error),
}

/// Encode `pixels` as a complete DDS file image.
///
/// The output is the 128-byte header followed by `pixels` unchanged, so
/// identical inputs always produce identical bytes.
///
/// # Example
///
/// ```
/// use texinject::dds::encode;
/// use texinject::texture::TextureFormat;
///
/// let pixels = vec![0xAB; 2 * 2 * 4];
/// let dds = encode(2, 2, TextureFormat::Bgra8, &pixels).unwrap();
/// assert_eq!(dds.len(), 128 + 16);
/// assert_eq!(&dds[..4], b"DDS ");
/// ```
pub fn encode(
    width: u32,
    height: u32,
    format: TextureFormat,
    pixels: &[u8],
) -> DdsResult<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(DdsError::InvalidDimensions { width, height });
    }

    let too_large = || DdsError::DimensionsTooLarge {
        width,
        height,
        format,
    };
    let expected = format.payload_size(width, height).ok_or_else(too_large)?;
    let header = DdsHeader::for_texture(width, height, format).ok_or_else(too_large)?;

    if pixels.len() as u64 != expected {
        return Err(DdsError::PayloadSizeMismatch {
            width,
            height,
            format,
            expected,
            actual: pixels.len() as u64,
        });
    }

    let mut out = Vec::with_capacity(DDS_FILE_HEADER_LEN + pixels.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(pixels);
    Ok(out)
}

/// Encode `pixels` and write the result to `path`.
pub fn write_dds(
    path: &Path,
    width: u32,
    height: u32,
    format: TextureFormat,
    pixels: &[u8],
) -> DdsResult<()> {
    let bytes = encode(width, height, format, pixels)?;
    fs::write(path, bytes)?;
    Ok(())
}
