//! Scan → encode → convert → overwrite loop.

use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tempfile::TempDir;
use tracing::{debug, info, warn};

use super::config::PatcherConfig;
use super::error::{PatchError, PatchResult};
use super::outcome::{fit_payload, PatchReport, RecordOutcome, RecordStatus, SkipReason};
use crate::converter::{read_converted_payload, ConversionError, TextureConverter};
use crate::dds::write_dds;
use crate::scanner::{ScanEvent, TextureRecord, TextureRecordScanner};

/// Receives progress from a running patcher.
pub trait PatchObserver {
    /// Called once per record, after its terminal state is known.
    ///
    /// `cursor` is the offset the scanner resumes from.
    fn on_outcome(&mut self, _outcome: &RecordOutcome, _cursor: u64, _container_len: u64) {}

    /// Called once when the container is exhausted.
    fn on_finished(&mut self, _report: &PatchReport) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PatchObserver for NoopObserver {}

/// Replaces texture payloads inside a container with converted versions.
///
/// Records are handled strictly one after another. For each one the raw
/// payload is wrapped in a DDS file inside a private scratch directory,
/// handed to the converter, and the converted payload (minus its platform
/// header) is written back over the original bytes. The scratch directory
/// is removed whatever the outcome.
///
/// Writes are bounded by the record's slot: a converted payload longer than
/// `data_size` is handled by [`OverflowPolicy`](super::OverflowPolicy) and
/// never spills into the following bytes.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use texinject::converter::OrbisImageConverter;
/// use texinject::patcher::{InPlaceTexturePatcher, PatcherConfig};
///
/// let patcher = InPlaceTexturePatcher::new(OrbisImageConverter::default(), PatcherConfig::default());
/// let report = patcher.patch_file(Path::new("pakchunk0-WindowsNoEditor.ucas")).unwrap();
/// println!("patched {} of {} textures", report.patched_count(), report.found_count());
/// ```
pub struct InPlaceTexturePatcher<C> {
    converter: C,
    config: PatcherConfig,
}

impl<C: TextureConverter> InPlaceTexturePatcher<C> {
    pub fn new(converter: C, config: PatcherConfig) -> Self {
        Self { converter, config }
    }

    pub fn config(&self) -> &PatcherConfig {
        &self.config
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Open `path` for read-write and patch it.
    pub fn patch_file(&self, path: &Path) -> PatchResult<PatchReport> {
        self.patch_file_with_observer(path, &mut NoopObserver)
    }

    /// Open `path` for read-write and patch it, reporting progress.
    ///
    /// Failing to open the container aborts before anything is read or
    /// written.
    pub fn patch_file_with_observer(
        &self,
        path: &Path,
        observer: &mut dyn PatchObserver,
    ) -> PatchResult<PatchReport> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| PatchError::OpenContainer {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            container = %path.display(),
            converter = self.converter.name(),
            overflow_policy = %self.config.overflow_policy,
            dry_run = self.config.dry_run,
            "Patching container"
        );

        let report = self.patch(&mut file, observer)?;

        if report.patched_count() > 0 {
            file.sync_all().map_err(|source| PatchError::Sync {
                path: path.to_path_buf(),
                source,
            })?;
        }

        Ok(report)
    }

    /// Patch every record found in `container`.
    pub fn patch<S: Read + Write + Seek>(
        &self,
        container: &mut S,
        observer: &mut dyn PatchObserver,
    ) -> PatchResult<PatchReport> {
        let container_len = container
            .seek(SeekFrom::End(0))
            .map_err(|source| PatchError::Read { offset: 0, source })?;
        let mut scanner =
            TextureRecordScanner::with_window_size(container_len, self.config.window_size);
        let mut report = PatchReport::new(container_len);

        while let Some(event) = scanner.next_event(container)? {
            let outcome = match event {
                ScanEvent::Oversize {
                    record,
                    container_len,
                } => {
                    let data_end = record.data_end();
                    RecordOutcome::new(
                        record,
                        RecordStatus::Skipped(SkipReason::OversizeRead {
                            data_end,
                            container_len,
                        }),
                    )
                }
                ScanEvent::Record(record) => {
                    let outcome = self.process_record(container, record)?;
                    if outcome.status.is_patched() {
                        scanner.invalidate();
                    }
                    outcome
                }
            };

            observer.on_outcome(&outcome, scanner.cursor(), container_len);
            report.push(outcome);
        }

        info!(
            found = report.found_count(),
            patched = report.patched_count(),
            skipped = report.skipped_count(),
            bytes_written = report.bytes_written(),
            "Container scan complete"
        );
        observer.on_finished(&report);

        Ok(report)
    }

    fn process_record<S: Read + Write + Seek>(
        &self,
        container: &mut S,
        record: TextureRecord,
    ) -> PatchResult<RecordOutcome> {
        info!(
            width = record.width,
            height = record.height,
            format = %record.format,
            data_offset = record.data_offset,
            "Reading texture"
        );

        if self.config.dry_run {
            return Ok(RecordOutcome::new(record, RecordStatus::Found));
        }

        let pixels = read_payload(container, &record)?;
        let scratch = self.scratch_dir()?;

        let status = self.convert_and_write(container, &record, &pixels, scratch.path());

        if let Some(ref artifacts_dir) = self.config.artifacts_dir {
            keep_artifacts(scratch.path(), artifacts_dir);
        }
        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            warn!(path = %scratch_path.display(), error = %e, "Failed to remove scratch directory");
        }

        Ok(RecordOutcome::new(record, status?))
    }

    fn convert_and_write<S: Write + Seek>(
        &self,
        container: &mut S,
        record: &TextureRecord,
        pixels: &[u8],
        scratch: &Path,
    ) -> PatchResult<RecordStatus> {
        let dds_path = scratch.join(format!("image_{:x}.dds", record.record_start));
        write_dds(&dds_path, record.width, record.height, record.format, pixels)?;

        let converted_path = match self.converter.convert(&dds_path) {
            Ok(path) => path,
            Err(e) => return Ok(self.conversion_failed(record, e)),
        };

        let payload = match read_converted_payload(&converted_path) {
            Ok(payload) => payload,
            Err(ConversionError::OutputTooShort { len, .. }) => {
                warn!(data_offset = record.data_offset, len, "Converted file shorter than its header");
                return Ok(RecordStatus::Skipped(SkipReason::ConvertedFileTooShort { len }));
            }
            Err(e) => return Ok(self.conversion_failed(record, e)),
        };

        let payload_len = payload.len() as u64;
        let slot = match fit_payload(payload_len, record.data_size, self.config.overflow_policy) {
            Ok(slot) => slot,
            Err(reason) => {
                warn!(
                    data_offset = record.data_offset,
                    payload_len,
                    slot_len = record.data_size,
                    "Converted payload does not fit its slot, leaving original bytes"
                );
                return Ok(RecordStatus::Skipped(reason));
            }
        };

        if slot.truncated {
            warn!(
                data_offset = record.data_offset,
                payload_len,
                slot_len = record.data_size,
                "Truncating converted payload to slot size"
            );
        } else if payload_len < record.data_size {
            debug!(
                data_offset = record.data_offset,
                payload_len,
                slot_len = record.data_size,
                "Converted payload shorter than slot, trailing bytes kept"
            );
        }

        write_payload(container, record.data_offset, &payload[..slot.len as usize])?;

        info!(
            data_offset = record.data_offset,
            bytes_written = slot.len,
            "Injected converted texture"
        );

        Ok(RecordStatus::Patched {
            bytes_written: slot.len,
            truncated: slot.truncated,
        })
    }

    fn conversion_failed(&self, record: &TextureRecord, error: ConversionError) -> RecordStatus {
        warn!(
            converter = self.converter.name(),
            data_offset = record.data_offset,
            error = %error,
            "Texture conversion failed, leaving original bytes"
        );
        if let Some((stdout, stderr)) = error.diagnostics() {
            debug!(stdout = %stdout.trim(), stderr = %stderr.trim(), "Converter diagnostics");
        }
        RecordStatus::Skipped(SkipReason::ConversionFailed(error.to_string()))
    }

    fn scratch_dir(&self) -> PatchResult<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("texinject-");

        let result = match self.config.temp_dir {
            Some(ref parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        };

        result.map_err(|source| PatchError::Scratch {
            path: self
                .config
                .temp_dir
                .clone()
                .unwrap_or_else(std::env::temp_dir),
            source,
        })
    }
}

fn read_payload<S: Read + Seek>(container: &mut S, record: &TextureRecord) -> PatchResult<Vec<u8>> {
    let mut pixels = vec![0u8; record.data_size as usize];
    container
        .seek(SeekFrom::Start(record.data_offset))
        .and_then(|_| container.read_exact(&mut pixels))
        .map_err(|source| PatchError::Read {
            offset: record.data_offset,
            source,
        })?;
    Ok(pixels)
}

fn write_payload<S: Write + Seek>(container: &mut S, offset: u64, payload: &[u8]) -> PatchResult<()> {
    container
        .seek(SeekFrom::Start(offset))
        .and_then(|_| container.write_all(payload))
        .and_then(|_| container.flush())
        .map_err(|source| PatchError::Write { offset, source })
}

/// Copy scratch files into `dest`. Failures are logged only.
fn keep_artifacts(scratch: &Path, dest: &Path) {
    if let Err(e) = fs::create_dir_all(dest) {
        warn!(path = %dest.display(), error = %e, "Failed to create artifacts directory");
        return;
    }

    let entries = match fs::read_dir(scratch) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %scratch.display(), error = %e, "Failed to list scratch directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let target = dest.join(entry.file_name());
        if let Err(e) = fs::copy(entry.path(), &target) {
            warn!(path = %target.display(), error = %e, "Failed to keep artifact");
        }
    }
}
