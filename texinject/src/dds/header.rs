//! DDS header layout.
//!
//! Only the subset of the DirectDraw Surface header needed to describe a
//! single uncompressed, single-mip 2D surface is produced. All fields are
//! little-endian `u32`.

use crate::texture::TextureFormat;

/// File magic, `"DDS "`.
pub const DDS_MAGIC: [u8; 4] = *b"DDS ";

/// Value of the header size field (excludes the magic).
pub const DDS_HEADER_SIZE: u32 = 124;

/// Total bytes preceding the pixel data (magic plus header).
pub const DDS_FILE_HEADER_LEN: usize = 128;

/// Size of the pixel format sub-block.
pub const DDS_PIXEL_FORMAT_SIZE: u32 = 32;

/// DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT | DDSD_MIPMAPCOUNT.
pub const DDSD_FLAGS: u32 = 0x0002_1007;

/// DDPF_ALPHAPIXELS | DDPF_RGB.
pub const DDPF_RGB_ALPHA: u32 = 0x41;

/// DDSCAPS_TEXTURE.
pub const DDSCAPS_TEXTURE: u32 = 0x1000;

const RESERVED1_LEN: usize = 44;

/// Pixel format sub-block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdsPixelFormat {
    pub size: u32,
    pub flags: u32,
    pub four_cc: u32,
    pub rgb_bit_count: u32,
    pub r_mask: u32,
    pub g_mask: u32,
    pub b_mask: u32,
    pub a_mask: u32,
}

impl DdsPixelFormat {
    /// Uncompressed BGRA channel layout at the given bit depth.
    pub fn bgra(rgb_bit_count: u32) -> Self {
        Self {
            size: DDS_PIXEL_FORMAT_SIZE,
            flags: DDPF_RGB_ALPHA,
            four_cc: 0,
            rgb_bit_count,
            r_mask: 0x00FF_0000,
            g_mask: 0x0000_FF00,
            b_mask: 0x0000_00FF,
            a_mask: 0xFF00_0000,
        }
    }
}

/// Minimal DDS header for a single-surface texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdsHeader {
    pub flags: u32,
    pub height: u32,
    pub width: u32,
    pub pitch_or_linear_size: u32,
    pub depth: u32,
    pub mipmap_count: u32,
    pub pixel_format: DdsPixelFormat,
    pub caps: u32,
    pub caps2: u32,
    pub caps3: u32,
    pub caps4: u32,
}

impl DdsHeader {
    /// Build the header describing a `width` × `height` texture.
    ///
    /// Returns `None` when the row pitch does not fit the 32-bit field.
    pub fn for_texture(width: u32, height: u32, format: TextureFormat) -> Option<Self> {
        Some(Self {
            flags: DDSD_FLAGS,
            height,
            width,
            pitch_or_linear_size: format.pitch(width)?,
            depth: 1,
            mipmap_count: 1,
            pixel_format: DdsPixelFormat::bgra(format.bit_count()),
            caps: DDSCAPS_TEXTURE,
            caps2: 0,
            caps3: 0,
            caps4: 0,
        })
    }

    /// Serialize magic and header into exactly 128 bytes.
    pub fn to_bytes(&self) -> [u8; DDS_FILE_HEADER_LEN] {
        let mut out = [0u8; DDS_FILE_HEADER_LEN];
        let mut writer = FieldWriter::new(&mut out);

        writer.bytes(&DDS_MAGIC);
        writer.u32(DDS_HEADER_SIZE);
        writer.u32(self.flags);
        writer.u32(self.height);
        writer.u32(self.width);
        writer.u32(self.pitch_or_linear_size);
        writer.u32(self.depth);
        writer.u32(self.mipmap_count);
        writer.skip(RESERVED1_LEN);

        let pf = &self.pixel_format;
        writer.u32(pf.size);
        writer.u32(pf.flags);
        writer.u32(pf.four_cc);
        writer.u32(pf.rgb_bit_count);
        writer.u32(pf.r_mask);
        writer.u32(pf.g_mask);
        writer.u32(pf.b_mask);
        writer.u32(pf.a_mask);

        writer.u32(self.caps);
        writer.u32(self.caps2);
        writer.u32(self.caps3);
        writer.u32(self.caps4);
        // reserved2
        writer.u32(0);

        debug_assert_eq!(writer.pos, DDS_FILE_HEADER_LEN);
        out
    }
}

/// Sequential little-endian writer over a fixed buffer.
struct FieldWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> FieldWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn bytes(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    fn u32(&mut self, value: u32) {
        self.bytes(&value.to_le_bytes());
    }

    fn skip(&mut self, len: usize) {
        self.pos += len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_u32(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_header_is_128_bytes_with_magic() {
        let bytes = DdsHeader::for_texture(8, 8, TextureFormat::Bgra8).unwrap().to_bytes();
        assert_eq!(bytes.len(), 128);
        assert_eq!(&bytes[0..4], b"DDS ");
        assert_eq!(read_u32(&bytes, 4), 124);
    }

    #[test]
    fn test_header_dimensions_order() {
        let bytes = DdsHeader::for_texture(64, 32, TextureFormat::Bgra8).unwrap().to_bytes();
        // height precedes width
        assert_eq!(read_u32(&bytes, 12), 32);
        assert_eq!(read_u32(&bytes, 16), 64);
    }

    #[test]
    fn test_header_pitch_and_bit_count_bgra8() {
        let bytes = DdsHeader::for_texture(16, 4, TextureFormat::Bgra8).unwrap().to_bytes();
        assert_eq!(read_u32(&bytes, 20), 64);
        assert_eq!(read_u32(&bytes, 88), 32);
    }

    #[test]
    fn test_header_refuses_unrepresentable_pitch() {
        assert!(DdsHeader::for_texture(1 << 30, 1, TextureFormat::Bgra8).is_none());
        assert!(DdsHeader::for_texture(1 << 30, 1, TextureFormat::Bc7).is_some());
    }

    #[test]
    fn test_header_pitch_and_bit_count_bc7() {
        let bytes = DdsHeader::for_texture(16, 4, TextureFormat::Bc7).unwrap().to_bytes();
        assert_eq!(read_u32(&bytes, 20), 16);
        assert_eq!(read_u32(&bytes, 88), 8);
    }

    #[test]
    fn test_reserved_block_is_zeroed() {
        let bytes = DdsHeader::for_texture(8, 8, TextureFormat::Bgra8).unwrap().to_bytes();
        assert!(bytes[32..76].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_pixel_format_block() {
        let bytes = DdsHeader::for_texture(8, 8, TextureFormat::Bgra8).unwrap().to_bytes();
        assert_eq!(read_u32(&bytes, 76), 32);
        assert_eq!(read_u32(&bytes, 80), 0x41);
        assert_eq!(read_u32(&bytes, 84), 0);
        assert_eq!(read_u32(&bytes, 92), 0x00FF_0000);
        assert_eq!(read_u32(&bytes, 96), 0x0000_FF00);
        assert_eq!(read_u32(&bytes, 100), 0x0000_00FF);
        assert_eq!(read_u32(&bytes, 104), 0xFF00_0000);
        assert_eq!(read_u32(&bytes, 108), 0x1000);
        assert!(bytes[112..128].iter().all(|&b| b == 0));
    }
}
