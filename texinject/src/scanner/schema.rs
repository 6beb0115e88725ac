//! Byte layout of texture descriptors inside asset containers.
//!
//! The layout is undocumented; these offsets were established empirically
//! against shipped containers. Nothing here is a protocol guarantee, so every
//! match built from these constants is re-validated by the scanner.
//!
//! Relative to a candidate sentinel at `M`:
//!
//! ```text
//! M          +4            +244    +248     +256          +260        +260+n   +292+n
//! ┌──────────┬─────────────┬───────┬────────┬─────┬───────┬───────────┬────────┬─────────
//! │ 00000000 │ ...         │ width │ height │ ... │ n     │ name tag  │ ...    │ payload
//! └──────────┴─────────────┴───────┴────────┴─────┴───────┴───────────┴────────┴─────────
//! ```

/// Candidate sentinel value.
pub const SENTINEL: [u8; 4] = [0, 0, 0, 0];

/// Length of the sentinel.
pub const SENTINEL_LEN: u64 = 4;

/// Bytes between the end of the sentinel and the name length field.
pub const DESCRIPTOR_GAP: u64 = 0xFC;

/// Width of the little-endian name length field.
pub const NAME_LENGTH_FIELD: u64 = 4;

/// Longest name tag considered plausible.
pub const MAX_NAME_LENGTH: u32 = 256;

/// Bytes between the end of the height field and the name length field.
pub const DIMENSIONS_BACKTRACK: u64 = 0xC;

/// Width of each little-endian dimension field.
pub const DIMENSION_FIELD: u64 = 4;

/// Bytes between the end of the name tag (as re-traversed) and the payload.
pub const PAYLOAD_GAP: u64 = 0x20;

/// Distance past the end of a consumed payload at which scanning resumes.
pub const RESUME_PADDING: u64 = 1;

/// Offset of the name length field for a sentinel at `record_start`.
pub fn name_length_offset(record_start: u64) -> u64 {
    record_start + SENTINEL_LEN + DESCRIPTOR_GAP
}

/// Offset of the name tag bytes.
pub fn name_offset(record_start: u64) -> u64 {
    name_length_offset(record_start) + NAME_LENGTH_FIELD
}

/// Offset of the width field, reached by seeking back from the end of the name.
pub fn dimensions_offset(record_start: u64, name_len: u32) -> u64 {
    let after_name = name_offset(record_start) + u64::from(name_len);
    after_name - (u64::from(name_len) + NAME_LENGTH_FIELD + DIMENSIONS_BACKTRACK)
}

/// Offset of the pixel payload.
///
/// After reading width and height the reader skips forward over another
/// width/height pair plus the name length, then over [`PAYLOAD_GAP`].
pub fn payload_offset(record_start: u64, name_len: u32) -> u64 {
    let after_dimensions = dimensions_offset(record_start, name_len) + 2 * DIMENSION_FIELD;
    after_dimensions + 2 * DIMENSION_FIELD + u64::from(name_len) + PAYLOAD_GAP
}

/// Bytes that must exist after `record_start` to read the fixed descriptor
/// fields (everything up to and including the name length).
pub const FIXED_DESCRIPTOR_LEN: u64 = SENTINEL_LEN + DESCRIPTOR_GAP + NAME_LENGTH_FIELD;
