//! Heuristic texture record scanner.

use std::io::{self, Read, Seek, SeekFrom};

use thiserror::Error;
use tracing::{debug, trace, warn};

use super::record::{RejectReason, ScanEvent, ScanStep, TextureRecord};
use super::schema::{
    dimensions_offset, name_length_offset, name_offset, payload_offset, MAX_NAME_LENGTH,
    SENTINEL, SENTINEL_LEN,
};
use super::window::{ScanWindow, DEFAULT_WINDOW_SIZE};
use crate::texture::TextureFormat;

/// Result type for scanning.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that stop a scan.
///
/// Malformed candidates are not errors; they surface as
/// [`ScanStep::Rejected`].
#[derive(Debug, Error)]
pub enum ScanError {
    /// Reading the container failed.
    #[error("I/O error while scanning: {0}")]
    Io(#[from] io::Error),
}

/// Forward-only scanner over a container of fixed length.
///
/// The scanner does not own the container; each call borrows it, so the
/// caller can write to the same handle between records. After any write,
/// call [`invalidate`](Self::invalidate) so stale cached bytes are dropped.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use texinject::scanner::TextureRecordScanner;
///
/// let mut container = Cursor::new(vec![0xEEu8; 4096]);
/// let mut scanner = TextureRecordScanner::for_source(&mut container).unwrap();
/// assert!(scanner.next_event(&mut container).unwrap().is_none());
/// ```
#[derive(Debug)]
pub struct TextureRecordScanner {
    cursor: u64,
    container_len: u64,
    window: ScanWindow,
}

impl TextureRecordScanner {
    /// Create a scanner for a container of `container_len` bytes.
    pub fn new(container_len: u64) -> Self {
        Self::with_window_size(container_len, DEFAULT_WINDOW_SIZE)
    }

    /// Create a scanner with a custom read window size.
    pub fn with_window_size(container_len: u64, window_size: usize) -> Self {
        Self {
            cursor: 0,
            container_len,
            window: ScanWindow::with_capacity(window_size),
        }
    }

    /// Create a scanner sized to `src` by seeking to its end.
    pub fn for_source<S: Seek>(src: &mut S) -> ScanResult<Self> {
        let len = src.seek(SeekFrom::End(0))?;
        Ok(Self::new(len))
    }

    /// Next offset that will be examined.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Length of the container being scanned.
    pub fn container_len(&self) -> u64 {
        self.container_len
    }

    /// Continue scanning from a saved cursor.
    pub fn resume_at(&mut self, offset: u64) {
        self.cursor = offset;
    }

    /// Discard cached container bytes.
    pub fn invalidate(&mut self) {
        self.window.invalidate();
    }

    /// Whether the cursor has passed the last possible sentinel.
    pub fn is_finished(&self) -> bool {
        self.cursor.saturating_add(SENTINEL_LEN) > self.container_len
    }

    /// Advance to the next event, skipping rejected candidates.
    pub fn next_event<R: Read + Seek>(&mut self, src: &mut R) -> ScanResult<Option<ScanEvent>> {
        loop {
            match self.step(src)? {
                ScanStep::Rejected { .. } => continue,
                ScanStep::Event(event) => return Ok(Some(event)),
                ScanStep::Finished => return Ok(None),
            }
        }
    }

    /// Examine the next candidate sentinel.
    ///
    /// On rejection the cursor moves to one byte past the candidate. On a
    /// record the cursor moves to [`TextureRecord::resume_offset`]. On an
    /// oversize descriptor the cursor moves one byte past the candidate,
    /// since its payload was never consumed.
    pub fn step<R: Read + Seek>(&mut self, src: &mut R) -> ScanResult<ScanStep> {
        let record_start = match self.find_sentinel(src)? {
            Some(offset) => offset,
            None => {
                self.cursor = self.container_len;
                return Ok(ScanStep::Finished);
            }
        };

        match self.validate(src, record_start)? {
            Err(reason) => {
                trace!(record_start, %reason, "Rejected candidate sentinel");
                self.cursor = record_start + 1;
                Ok(ScanStep::Rejected {
                    record_start,
                    reason,
                })
            }
            Ok(record) if record.data_end() > self.container_len => {
                warn!(
                    record_start,
                    data_offset = record.data_offset,
                    data_size = record.data_size,
                    container_len = self.container_len,
                    "Texture payload extends past end of container"
                );
                self.cursor = record_start + 1;
                Ok(ScanStep::Event(ScanEvent::Oversize {
                    record,
                    container_len: self.container_len,
                }))
            }
            Ok(record) => {
                debug!(
                    record_start,
                    width = record.width,
                    height = record.height,
                    format = %record.format,
                    data_offset = record.data_offset,
                    data_size = record.data_size,
                    "Found texture record"
                );
                self.cursor = record.resume_offset();
                Ok(ScanStep::Event(ScanEvent::Record(record)))
            }
        }
    }

    /// Iterate events until the container is exhausted.
    pub fn events<'a, R: Read + Seek>(&'a mut self, src: &'a mut R) -> ScanEvents<'a, R> {
        ScanEvents { scanner: self, src }
    }

    /// First sentinel at or after the cursor.
    fn find_sentinel<R: Read + Seek>(&mut self, src: &mut R) -> ScanResult<Option<u64>> {
        let sentinel_len = SENTINEL_LEN as usize;

        loop {
            if self.is_finished() {
                return Ok(None);
            }

            let chunk =
                self.window
                    .read_available(src, self.cursor, sentinel_len, self.container_len)?;

            if let Some(pos) = chunk.windows(sentinel_len).position(|w| w == SENTINEL) {
                return Ok(Some(self.cursor + pos as u64));
            }

            // Every start position leaving room for a full sentinel was checked.
            self.cursor += (chunk.len() - (sentinel_len - 1)) as u64;
        }
    }

    /// Re-validate the descriptor behind a candidate sentinel.
    fn validate<R: Read + Seek>(
        &mut self,
        src: &mut R,
        record_start: u64,
    ) -> ScanResult<Result<TextureRecord, RejectReason>> {
        let limit = self.container_len;

        let name_len = match self
            .window
            .read(src, name_length_offset(record_start), 4, limit)?
        {
            Some(bytes) => read_u32_le(bytes),
            None => return Ok(Err(RejectReason::Truncated)),
        };
        if name_len > MAX_NAME_LENGTH {
            return Ok(Err(RejectReason::NameTooLong(name_len)));
        }

        let tag = match self
            .window
            .read(src, name_offset(record_start), name_len as usize, limit)?
        {
            Some(bytes) => decode_tag(bytes),
            None => return Ok(Err(RejectReason::Truncated)),
        };
        let format = match TextureFormat::from_tag(&tag) {
            Some(format) => format,
            None => return Ok(Err(RejectReason::UnknownTag(tag))),
        };

        let (width, height) = match self.window.read(
            src,
            dimensions_offset(record_start, name_len),
            8,
            limit,
        )? {
            Some(bytes) => (read_u32_le(&bytes[0..4]), read_u32_le(&bytes[4..8])),
            None => return Ok(Err(RejectReason::Truncated)),
        };
        if width == 0 || height == 0 {
            return Ok(Err(RejectReason::ZeroDimensions { width, height }));
        }
        if format.pitch(width).is_none() {
            return Ok(Err(RejectReason::SizeOverflow { width, height }));
        }

        let data_offset = payload_offset(record_start, name_len);
        Ok(TextureRecord::new(record_start, width, height, format, data_offset)
            .ok_or(RejectReason::SizeOverflow { width, height }))
    }
}

/// Iterator over scan events.
pub struct ScanEvents<'a, R> {
    scanner: &'a mut TextureRecordScanner,
    src: &'a mut R,
}

impl<R: Read + Seek> Iterator for ScanEvents<'_, R> {
    type Item = ScanResult<ScanEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.scanner.next_event(self.src).transpose()
    }
}

/// Scan a whole container and collect every in-bounds record.
pub fn scan_records<R: Read + Seek>(src: &mut R) -> ScanResult<Vec<TextureRecord>> {
    let mut scanner = TextureRecordScanner::for_source(src)?;
    let mut records = Vec::new();
    for event in scanner.events(src) {
        if let ScanEvent::Record(record) = event? {
            records.push(record);
        }
    }
    Ok(records)
}

fn read_u32_le(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Best-effort text decoding: invalid UTF-8 is dropped, trailing NUL
/// padding stripped.
fn decode_tag(bytes: &[u8]) -> String {
    let decoded: String = String::from_utf8_lossy(bytes)
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .collect();
    decoded.trim_end_matches('\0').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{build_container, RecordFixture, FILLER};
    use std::io::Cursor;

    fn scanner_for(data: &[u8]) -> (TextureRecordScanner, Cursor<Vec<u8>>) {
        let mut src = Cursor::new(data.to_vec());
        let scanner = TextureRecordScanner::for_source(&mut src).unwrap();
        (scanner, src)
    }

    #[test]
    fn test_decode_tag_strips_trailing_nul() {
        assert_eq!(decode_tag(b"PF_BC7\0\0\0"), "PF_BC7");
    }

    #[test]
    fn test_decode_tag_drops_invalid_utf8() {
        assert_eq!(decode_tag(b"PF_\xFFBC7\0"), "PF_BC7");
    }

    #[test]
    fn test_decode_tag_keeps_leading_nul() {
        assert_eq!(decode_tag(b"\0PF_BC7"), "\0PF_BC7");
    }

    #[test]
    fn test_no_sentinel_yields_nothing() {
        let data = vec![0x01u8; 10_000];
        let (mut scanner, mut src) = scanner_for(&data);

        assert!(scanner.next_event(&mut src).unwrap().is_none());
        assert!(scanner.is_finished());
    }

    #[test]
    fn test_empty_container() {
        let (mut scanner, mut src) = scanner_for(&[]);
        assert_eq!(scanner.step(&mut src).unwrap(), ScanStep::Finished);
    }

    #[test]
    fn test_single_record_at_known_offset() {
        let fixture = RecordFixture::bgra8(8, 8).at(1000);
        let (data, expected) = build_container(&[fixture], 512);
        let (mut scanner, mut src) = scanner_for(&data);

        let event = scanner.next_event(&mut src).unwrap().unwrap();
        let ScanEvent::Record(record) = &event else {
            panic!("expected record, got {:?}", event);
        };

        assert_eq!(record.record_start, 1000);
        assert_eq!(record.width, 8);
        assert_eq!(record.height, 8);
        assert_eq!(record.format, TextureFormat::Bgra8);
        assert_eq!(record.data_offset, 1000 + 292 + 11);
        assert_eq!(record.data_size, 256);
        assert_eq!(record, &expected[0]);

        assert!(scanner.next_event(&mut src).unwrap().is_none());
    }

    #[test]
    fn test_bc7_record() {
        let fixture = RecordFixture::bc7(16, 4).at(0);
        let (data, expected) = build_container(&[fixture], 64);
        let records = scan_records(&mut Cursor::new(data)).unwrap();

        assert_eq!(records, expected);
        assert_eq!(records[0].data_size, 64);
        assert_eq!(records[0].data_offset, 292 + 6);
    }

    #[test]
    fn test_cursor_resumes_after_payload() {
        let fixture = RecordFixture::bgra8(8, 8).at(128);
        let (data, expected) = build_container(&[fixture], 64);
        let (mut scanner, mut src) = scanner_for(&data);

        scanner.next_event(&mut src).unwrap().unwrap();
        assert_eq!(
            scanner.cursor(),
            expected[0].data_offset + expected[0].data_size + 1
        );
    }

    #[test]
    fn test_unknown_tag_advances_one_byte() {
        let fixture = RecordFixture::bgra8(8, 8).at(200).with_tag("PF_RGBA16");
        let (data, _) = build_container(&[fixture], 64);
        let (mut scanner, mut src) = scanner_for(&data);

        let step = scanner.step(&mut src).unwrap();
        assert_eq!(
            step,
            ScanStep::Rejected {
                record_start: 200,
                reason: RejectReason::UnknownTag("PF_RGBA16".to_string()),
            }
        );
        assert_eq!(scanner.cursor(), 201);
        assert!(scanner.next_event(&mut src).unwrap().is_none());
    }

    #[test]
    fn test_name_too_long_is_rejected() {
        let mut data = vec![FILLER; 1024];
        data[0..4].copy_from_slice(&SENTINEL);
        data[256..260].copy_from_slice(&257u32.to_le_bytes());
        let (mut scanner, mut src) = scanner_for(&data);

        assert_eq!(
            scanner.step(&mut src).unwrap(),
            ScanStep::Rejected {
                record_start: 0,
                reason: RejectReason::NameTooLong(257),
            }
        );
    }

    #[test]
    fn test_name_at_bound_is_read() {
        let mut tag = b"PF_BC7".to_vec();
        tag.resize(256, 0);
        let fixture = RecordFixture::bc7(4, 4).at(0).with_raw_tag(tag);
        let (data, expected) = build_container(&[fixture], 16);

        let records = scan_records(&mut Cursor::new(data)).unwrap();
        assert_eq!(records, expected);
        assert_eq!(records[0].data_offset, 292 + 256);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let fixture = RecordFixture::bgra8(0, 8).at(0);
        let (data, _) = build_container(&[fixture], 16);
        let (mut scanner, mut src) = scanner_for(&data);

        assert_eq!(
            scanner.step(&mut src).unwrap(),
            ScanStep::Rejected {
                record_start: 0,
                reason: RejectReason::ZeroDimensions {
                    width: 0,
                    height: 8
                },
            }
        );
    }

    /// Stamp `width` and `height` over the dimension fields of `fixture`.
    fn with_dimensions(data: &mut [u8], fixture: &RecordFixture, width: u32, height: u32) {
        let at = dimensions_offset(fixture.start, fixture.tag.len() as u32) as usize;
        data[at..at + 4].copy_from_slice(&width.to_le_bytes());
        data[at + 4..at + 8].copy_from_slice(&height.to_le_bytes());
    }

    #[test]
    fn test_overflowing_dimensions_rejected() {
        let fixture = RecordFixture::bgra8(1, 1).at(0);
        let (mut data, _) = build_container(&[fixture.clone()], 64);
        with_dimensions(&mut data, &fixture, u32::MAX, u32::MAX);
        let (mut scanner, mut src) = scanner_for(&data);

        assert_eq!(
            scanner.step(&mut src).unwrap(),
            ScanStep::Rejected {
                record_start: 0,
                reason: RejectReason::SizeOverflow {
                    width: u32::MAX,
                    height: u32::MAX
                },
            }
        );
        assert_eq!(scanner.cursor(), 1);
        assert!(scan_records(&mut Cursor::new(data)).unwrap().is_empty());
    }

    #[test]
    fn test_unrepresentable_pitch_rejected() {
        let fixture = RecordFixture::bgra8(1, 1).at(0);
        let (mut data, _) = build_container(&[fixture.clone()], 64);
        with_dimensions(&mut data, &fixture, 1 << 30, 1);
        let (mut scanner, mut src) = scanner_for(&data);

        assert_eq!(
            scanner.step(&mut src).unwrap(),
            ScanStep::Rejected {
                record_start: 0,
                reason: RejectReason::SizeOverflow {
                    width: 1 << 30,
                    height: 1
                },
            }
        );
    }

    #[test]
    fn test_scan_continues_past_overflowing_candidate() {
        let fixtures = [
            RecordFixture::bgra8(1, 1).at(0),
            RecordFixture::bgra8(4, 4).at(1000),
        ];
        let (mut data, expected) = build_container(&fixtures, 32);
        with_dimensions(&mut data, &fixtures[0], u32::MAX, u32::MAX);

        let records = scan_records(&mut Cursor::new(data)).unwrap();
        assert_eq!(records, vec![expected[1].clone()]);
    }

    #[test]
    fn test_truncated_descriptor_rejected() {
        let mut data = vec![FILLER; 100];
        data[10..14].copy_from_slice(&SENTINEL);
        let (mut scanner, mut src) = scanner_for(&data);

        assert_eq!(
            scanner.step(&mut src).unwrap(),
            ScanStep::Rejected {
                record_start: 10,
                reason: RejectReason::Truncated,
            }
        );
        assert_eq!(scanner.step(&mut src).unwrap(), ScanStep::Finished);
    }

    #[test]
    fn test_oversize_payload_reported_not_emitted() {
        let fixture = RecordFixture::bgra8(64, 64).at(0);
        let (mut data, expected) = build_container(&[fixture], 0);
        // Cut the payload short.
        data.truncate((expected[0].data_offset + 100) as usize);
        let container_len = data.len() as u64;
        let (mut scanner, mut src) = scanner_for(&data);

        let event = scanner.next_event(&mut src).unwrap().unwrap();
        assert_eq!(
            event,
            ScanEvent::Oversize {
                record: expected[0].clone(),
                container_len,
            }
        );
        assert_eq!(scanner.cursor(), 1);
    }

    #[test]
    fn test_multiple_records_in_order() {
        let fixtures = [
            RecordFixture::bgra8(4, 4).at(64),
            RecordFixture::bc7(8, 8).at(2000),
            RecordFixture::bgra8(2, 2).at(5000),
        ];
        let (data, expected) = build_container(&fixtures, 128);

        let records = scan_records(&mut Cursor::new(data)).unwrap();
        assert_eq!(records, expected);
    }

    #[test]
    fn test_small_window_finds_same_records() {
        let fixtures = [
            RecordFixture::bgra8(4, 4).at(10),
            RecordFixture::bc7(8, 8).at(900),
        ];
        let (data, expected) = build_container(&fixtures, 32);
        let mut src = Cursor::new(data.clone());
        let mut scanner = TextureRecordScanner::with_window_size(data.len() as u64, 5);

        let records: Vec<_> = scanner
            .events(&mut src)
            .map(|e| match e.unwrap() {
                ScanEvent::Record(r) => r,
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(records, expected);
    }

    #[test]
    fn test_sentinel_straddling_window_boundary() {
        let fixture = RecordFixture::bgra8(2, 2).at(14);
        let (data, expected) = build_container(&[fixture], 8);
        let mut src = Cursor::new(data.clone());
        let mut scanner = TextureRecordScanner::with_window_size(data.len() as u64, 16);

        let event = scanner.next_event(&mut src).unwrap().unwrap();
        assert_eq!(event, ScanEvent::Record(expected[0].clone()));
    }

    #[test]
    fn test_resume_at_saved_cursor() {
        let fixtures = [
            RecordFixture::bgra8(4, 4).at(0),
            RecordFixture::bgra8(4, 4).at(1000),
        ];
        let (data, expected) = build_container(&fixtures, 16);
        let mut src = Cursor::new(data.clone());

        let mut first = TextureRecordScanner::new(data.len() as u64);
        first.next_event(&mut src).unwrap();
        let saved = first.cursor();

        let mut second = TextureRecordScanner::new(data.len() as u64);
        second.resume_at(saved);
        let event = second.next_event(&mut src).unwrap().unwrap();
        assert_eq!(event, ScanEvent::Record(expected[1].clone()));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_nonzero_buffers_yield_nothing(data in proptest::collection::vec(1u8..=255, 0..4096)) {
                let records = scan_records(&mut Cursor::new(data)).unwrap();
                prop_assert!(records.is_empty());
            }

            #[test]
            fn test_arbitrary_buffers_stay_in_bounds(
                data in proptest::collection::vec(prop_oneof![Just(0u8), any::<u8>()], 0..2048)
            ) {
                let len = data.len() as u64;
                let mut src = Cursor::new(data);
                let mut scanner = TextureRecordScanner::with_window_size(len, 97);
                for event in scanner.events(&mut src) {
                    if let ScanEvent::Record(record) = event.unwrap() {
                        prop_assert!(record.data_end() <= len);
                        prop_assert!(record.data_size > 0);
                    }
                }
            }

            #[test]
            fn test_any_dimensions_never_escape_container(
                width in any::<u32>(),
                height in any::<u32>(),
                bc7 in any::<bool>(),
            ) {
                let fixture = if bc7 {
                    RecordFixture::bc7(1, 1)
                } else {
                    RecordFixture::bgra8(1, 1)
                }
                .at(8);
                let (mut data, _) = build_container(&[fixture.clone()], 256);
                with_dimensions(&mut data, &fixture, width, height);
                let len = data.len() as u64;

                let mut src = Cursor::new(data);
                let mut scanner = TextureRecordScanner::new(len);
                for event in scanner.events(&mut src) {
                    match event.unwrap() {
                        ScanEvent::Record(record) => {
                            prop_assert!(record.data_end() <= len);
                            prop_assert!(record.format.pitch(record.width).is_some());
                        }
                        ScanEvent::Oversize { record, .. } => {
                            prop_assert!(record.data_end() > len);
                        }
                    }
                }
            }
        }
    }
}
