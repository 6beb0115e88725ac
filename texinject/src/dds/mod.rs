//! Minimal DirectDraw Surface (DDS) container encoding.
//!
//! The external texture compiler only accepts DDS input, so each raw payload
//! lifted out of an asset container is wrapped in a 128-byte DDS header
//! before conversion. No compression or mipmap generation happens here: the
//! payload bytes are copied through untouched.
//!
//! ```text
//! ┌────────────┬──────────────────────────────┐
//! │ DDS header │ raw pixel payload            │
//! │ 128 bytes  │ width × height × bpp bytes   │
//! └────────────┴──────────────────────────────┘
//! ```

mod encoder;
mod header;

pub use encoder::{encode, write_dds, DdsError, DdsResult};
pub use header::{DdsHeader, DdsPixelFormat, DDS_FILE_HEADER_LEN};
