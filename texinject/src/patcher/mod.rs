//! In-place texture patching.
//!
//! Drives the [scanner](crate::scanner) over a container and, for every
//! record it yields, runs the encode → convert → overwrite sequence:
//!
//! ```text
//! Scanning ─► Candidate ─► Validated ─► Encoded ─► Converting ─┬─► Patched
//!    ▲                                                         └─► Skipped
//!    └──────────────── resume at data_offset + data_size + 1 ◄────────┘
//! ```
//!
//! Only I/O failures on the container itself abort a run. Everything that
//! can go wrong with a single record ends in [`RecordStatus::Skipped`] with
//! the original bytes left in place.

mod config;
mod error;
mod outcome;
mod texture_patcher;

pub use config::{OverflowPolicy, PatcherConfig};
pub use error::{PatchError, PatchResult};
pub use outcome::{fit_payload, PatchReport, RecordOutcome, RecordStatus, SkipReason, SlotWrite};
pub use texture_patcher::{InPlaceTexturePatcher, NoopObserver, PatchObserver};
