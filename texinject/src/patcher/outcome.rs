//! Per-record results of a patch run.

use std::fmt;

use super::config::OverflowPolicy;
use crate::scanner::TextureRecord;

/// Why a record was left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The record's payload would extend past the end of the container.
    OversizeRead { data_end: u64, container_len: u64 },
    /// The external converter failed or could not be run.
    ConversionFailed(String),
    /// The converted file is shorter than its platform header.
    ConvertedFileTooShort { len: usize },
    /// The converted payload is larger than the slot and the policy is
    /// [`OverflowPolicy::Reject`].
    PayloadOverflow { payload_len: u64, slot_len: u64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::OversizeRead {
                data_end,
                container_len,
            } => write!(
                f,
                "payload ends at 0x{:x}, past container end 0x{:x}",
                data_end, container_len
            ),
            SkipReason::ConversionFailed(msg) => write!(f, "conversion failed: {}", msg),
            SkipReason::ConvertedFileTooShort { len } => {
                write!(f, "converted file is only {} bytes", len)
            }
            SkipReason::PayloadOverflow {
                payload_len,
                slot_len,
            } => write!(
                f,
                "converted payload is {} bytes, slot holds {}",
                payload_len, slot_len
            ),
        }
    }
}

/// Terminal state of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    /// Converted payload written at the record's data offset.
    Patched {
        bytes_written: u64,
        /// Payload was cut to the slot size.
        truncated: bool,
    },
    /// Original bytes preserved.
    Skipped(SkipReason),
    /// Found during a dry run; nothing converted or written.
    Found,
}

impl RecordStatus {
    pub fn is_patched(&self) -> bool {
        matches!(self, RecordStatus::Patched { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RecordStatus::Skipped(_))
    }
}

/// A record and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub record: TextureRecord,
    pub status: RecordStatus,
}

impl RecordOutcome {
    pub fn new(record: TextureRecord, status: RecordStatus) -> Self {
        Self { record, status }
    }

    /// Bytes written into the container for this record.
    pub fn bytes_written(&self) -> u64 {
        match self.status {
            RecordStatus::Patched { bytes_written, .. } => bytes_written,
            _ => 0,
        }
    }
}

/// Summary of a whole run, in scan order.
#[derive(Debug, Clone, Default)]
pub struct PatchReport {
    pub container_len: u64,
    pub outcomes: Vec<RecordOutcome>,
}

impl PatchReport {
    pub fn new(container_len: u64) -> Self {
        Self {
            container_len,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: RecordOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn patched_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_patched()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_skipped()).count()
    }

    pub fn found_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn bytes_written(&self) -> u64 {
        self.outcomes.iter().map(RecordOutcome::bytes_written).sum()
    }

    pub fn truncated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RecordStatus::Patched { truncated: true, .. }))
            .count()
    }
}

/// How many converted bytes go into a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWrite {
    pub len: u64,
    pub truncated: bool,
}

/// Fit a converted payload into a slot of `slot_len` bytes.
///
/// A payload no longer than the slot is written whole; the slot's trailing
/// bytes keep their original contents. A longer payload is either refused
/// or cut to the slot, depending on `policy`. The result never exceeds
/// `slot_len`.
pub fn fit_payload(
    payload_len: u64,
    slot_len: u64,
    policy: OverflowPolicy,
) -> Result<SlotWrite, SkipReason> {
    if payload_len <= slot_len {
        return Ok(SlotWrite {
            len: payload_len,
            truncated: false,
        });
    }

    match policy {
        OverflowPolicy::Reject => Err(SkipReason::PayloadOverflow {
            payload_len,
            slot_len,
        }),
        OverflowPolicy::Truncate => Ok(SlotWrite {
            len: slot_len,
            truncated: true,
        }),
    }
}
