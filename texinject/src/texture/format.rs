//! Pixel format tags and their sizing rules.

use std::fmt;

/// Tag used by containers for uncompressed 32-bit BGRA textures.
pub const TAG_B8G8R8A8: &str = "PF_B8G8R8A8";

/// Tag used by containers for BC7 block-compressed textures.
pub const TAG_BC7: &str = "PF_BC7";

/// Pixel format of a texture record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8 bits per channel, stored B, G, R, A.
    Bgra8,
    /// BC7 block compression.
    Bc7,
}

impl TextureFormat {
    /// Parse a decoded name tag. Returns `None` for unrecognised tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            TAG_B8G8R8A8 => Some(TextureFormat::Bgra8),
            TAG_BC7 => Some(TextureFormat::Bc7),
            _ => None,
        }
    }

    /// The container tag for this format.
    pub fn tag(&self) -> &'static str {
        match self {
            TextureFormat::Bgra8 => TAG_B8G8R8A8,
            TextureFormat::Bc7 => TAG_BC7,
        }
    }

    /// Bytes used per pixel when sizing a payload slot.
    ///
    /// BC7 is sized at one byte per pixel. The real rate is 16 bytes per 4×4
    /// block, so this only approximates the slot size; the payload boundary
    /// for BC7 records has not been verified against real containers.
    pub fn bytes_per_pixel(&self) -> u64 {
        match self {
            TextureFormat::Bgra8 => 4,
            TextureFormat::Bc7 => 1,
        }
    }

    /// Size in bytes of a `width` × `height` payload in this format.
    ///
    /// Returns `None` when the size does not fit in a `u64`.
    pub fn payload_size(&self, width: u32, height: u32) -> Option<u64> {
        u64::from(width)
            .checked_mul(u64::from(height))?
            .checked_mul(self.bytes_per_pixel())
    }

    /// Row pitch written into the DDS header.
    ///
    /// The header field is 32 bits wide, so BGRA8 widths of 2^30 and above
    /// have no representable pitch and yield `None`.
    pub fn pitch(&self, width: u32) -> Option<u32> {
        match self {
            TextureFormat::Bgra8 => width.checked_mul(4),
            TextureFormat::Bc7 => Some(width),
        }
    }

    /// Bits per pixel written into the DDS pixel format block.
    pub fn bit_count(&self) -> u32 {
        match self {
            TextureFormat::Bgra8 => 32,
            TextureFormat::Bc7 => 8,
        }
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureFormat::Bgra8 => write!(f, "BGRA8"),
            TextureFormat::Bc7 => write!(f, "BC7"),
        }
    }
}
