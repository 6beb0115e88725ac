//! Texture pixel formats recognised inside asset containers.
//!
//! Containers describe each texture with a pixel-format name tag such as
//! `PF_B8G8R8A8`. Only two tags are understood; anything else is treated as
//! noise by the scanner.
//!
//! # Example
//!
//! ```
//! use texinject::texture::TextureFormat;
//!
//! let format = TextureFormat::from_tag("PF_B8G8R8A8").unwrap();
//! assert_eq!(format.bytes_per_pixel(), 4);
//! assert_eq!(format.payload_size(8, 8), Some(256));
//! ```

mod format;

pub use format::TextureFormat;
