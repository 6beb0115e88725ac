//! Synthetic container fixtures for unit tests.

use crate::scanner::schema::{
    dimensions_offset, name_length_offset, name_offset, payload_offset, SENTINEL,
};
use crate::scanner::TextureRecord;
use crate::texture::TextureFormat;

/// Byte used for every position not covered by a fixture. Non-zero so it
/// never forms a sentinel.
pub const FILLER: u8 = 0xEE;

/// Description of one record to embed in a synthetic container.
#[derive(Debug, Clone)]
pub struct RecordFixture {
    pub start: u64,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub tag: Vec<u8>,
}

impl RecordFixture {
    pub fn bgra8(width: u32, height: u32) -> Self {
        Self::new(width, height, TextureFormat::Bgra8)
    }

    pub fn bc7(width: u32, height: u32) -> Self {
        Self::new(width, height, TextureFormat::Bc7)
    }

    fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            start: 0,
            width,
            height,
            format,
            tag: format.tag().as_bytes().to_vec(),
        }
    }

    pub fn at(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    pub fn with_tag(self, tag: &str) -> Self {
        self.with_raw_tag(tag.as_bytes().to_vec())
    }

    pub fn with_raw_tag(mut self, tag: Vec<u8>) -> Self {
        self.tag = tag;
        self
    }

    /// The record the scanner should produce for this fixture.
    pub fn expected(&self) -> TextureRecord {
        TextureRecord::new(
            self.start,
            self.width,
            self.height,
            self.format,
            payload_offset(self.start, self.tag.len() as u32),
        )
        .expect("fixture dimensions fit in u64")
    }

    /// Payload bytes written for this fixture. Never zero.
    pub fn payload(&self) -> Vec<u8> {
        let size = self.expected().data_size as usize;
        (0..size)
            .map(|i| ((i as u64 + self.start) % 255) as u8 + 1)
            .collect()
    }

    fn end(&self) -> u64 {
        let record = self.expected();
        record.data_end()
    }
}

/// Build a container holding `fixtures`, followed by `tail` filler bytes.
///
/// Returns the bytes and the records expected for each fixture, in order.
pub fn build_container(fixtures: &[RecordFixture], tail: usize) -> (Vec<u8>, Vec<TextureRecord>) {
    let len = fixtures.iter().map(RecordFixture::end).max().unwrap_or(0) as usize + tail;
    let mut data = vec![FILLER; len];

    for fixture in fixtures {
        let start = fixture.start;
        let name_len = fixture.tag.len() as u32;

        put(&mut data, start, &SENTINEL);
        let dims = dimensions_offset(start, name_len);
        put(&mut data, dims, &fixture.width.to_le_bytes());
        put(&mut data, dims + 4, &fixture.height.to_le_bytes());
        put(&mut data, name_length_offset(start), &name_len.to_le_bytes());
        put(&mut data, name_offset(start), &fixture.tag);
        put(&mut data, payload_offset(start, name_len), &fixture.payload());
    }

    let expected = fixtures.iter().map(RecordFixture::expected).collect();
    (data, expected)
}

fn put(data: &mut [u8], offset: u64, bytes: &[u8]) {
    let offset = offset as usize;
    data[offset..offset + bytes.len()].copy_from_slice(bytes);
}
