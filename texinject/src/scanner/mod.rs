//! Texture record discovery inside packed asset containers.
//!
//! Containers have no index we can rely on, so textures are found by
//! pattern matching: every all-zero 4-byte word is a *candidate* sentinel,
//! and the bytes at fixed offsets after it must describe a recognised pixel
//! format with non-zero dimensions before a [`TextureRecord`] is emitted.
//!
//! ```text
//! cursor ──► 00000000? ──no──► cursor += 1
//!                │yes
//!                ▼
//!         name length ≤ 256? ──no──► cursor += 1
//!                │yes
//!                ▼
//!         tag recognised? ──no──► cursor += 1
//!                │yes
//!                ▼
//!         payload in bounds? ──no──► Oversize, cursor += 1
//!                │yes
//!                ▼
//!         Record, cursor = data_end + 1
//! ```
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use texinject::scanner::scan_records;
//!
//! let mut container = Cursor::new(vec![0xFFu8; 1024]);
//! assert!(scan_records(&mut container).unwrap().is_empty());
//! ```

mod record;
mod record_scanner;
pub mod schema;
mod window;

pub use record::{RejectReason, ScanEvent, ScanStep, TextureRecord};
pub use record_scanner::{scan_records, ScanError, ScanEvents, ScanResult, TextureRecordScanner};
pub use window::DEFAULT_WINDOW_SIZE;
