//! Scanner output types.

use std::fmt;
use std::ops::Range;

use super::schema::RESUME_PADDING;
use crate::texture::TextureFormat;

/// A texture descriptor found in a container, plus its payload location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRecord {
    /// Offset of the sentinel that started the match.
    pub record_start: u64,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// Offset of the first payload byte.
    pub data_offset: u64,
    /// Payload slot size in bytes.
    pub data_size: u64,
}

impl TextureRecord {
    /// Build a record, deriving `data_size` from the dimensions and format.
    ///
    /// Returns `None` when the payload size, its end offset or the resume
    /// offset after it does not fit in a `u64`.
    pub fn new(
        record_start: u64,
        width: u32,
        height: u32,
        format: TextureFormat,
        data_offset: u64,
    ) -> Option<Self> {
        let data_size = format.payload_size(width, height)?;
        data_offset
            .checked_add(data_size)?
            .checked_add(RESUME_PADDING)?;

        Some(Self {
            record_start,
            width,
            height,
            format,
            data_offset,
            data_size,
        })
    }

    /// One past the last payload byte.
    ///
    /// Saturates for hand-built records whose fields overflow; records from
    /// [`new`](Self::new) never do.
    pub fn data_end(&self) -> u64 {
        self.data_offset.saturating_add(self.data_size)
    }

    /// Payload byte range within the container.
    pub fn payload_range(&self) -> Range<u64> {
        self.data_offset..self.data_end()
    }

    /// Offset at which scanning continues once this record is consumed.
    pub fn resume_offset(&self) -> u64 {
        self.data_end().saturating_add(RESUME_PADDING)
    }
}

impl fmt::Display for TextureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}×{} {} at 0x{:x} ({} bytes, descriptor 0x{:x})",
            self.width,
            self.height,
            self.format,
            self.data_offset,
            self.data_size,
            self.record_start
        )
    }
}

/// Why a candidate sentinel was discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The descriptor would extend past the end of the container.
    Truncated,
    /// Name length exceeds the plausibility bound.
    NameTooLong(u32),
    /// The name tag is not a recognised pixel format.
    UnknownTag(String),
    /// Width or height is zero.
    ZeroDimensions { width: u32, height: u32 },
    /// The dimensions imply a payload size, payload end or DDS pitch that
    /// does not fit the integer width that holds it.
    SizeOverflow { width: u32, height: u32 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Truncated => write!(f, "descriptor truncated by end of container"),
            RejectReason::NameTooLong(len) => write!(f, "name length {} too long", len),
            RejectReason::UnknownTag(tag) => write!(f, "unknown format tag {:?}", tag),
            RejectReason::ZeroDimensions { width, height } => {
                write!(f, "zero dimension {}×{}", width, height)
            }
            RejectReason::SizeOverflow { width, height } => {
                write!(f, "dimensions {}×{} overflow payload sizing", width, height)
            }
        }
    }
}

/// Something the scanner reports to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A validated record whose payload lies inside the container.
    Record(TextureRecord),
    /// A descriptor that validated but whose payload would run past the end
    /// of the container. The payload is never read.
    Oversize {
        record: TextureRecord,
        container_len: u64,
    },
}

/// Result of advancing the scanner by one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStep {
    /// A candidate was examined and discarded; the cursor moved one byte.
    Rejected {
        record_start: u64,
        reason: RejectReason,
    },
    /// A candidate produced an event.
    Event(ScanEvent),
    /// No further candidates exist.
    Finished,
}
