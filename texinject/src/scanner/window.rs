//! Buffered read window over a seekable container.
//!
//! The scanner walks the container one byte at a time, so reads are served
//! from a single cached block instead of issuing a seek per offset.

use std::io::{self, Read, Seek, SeekFrom};

/// Default window size.
pub const DEFAULT_WINDOW_SIZE: usize = 64 * 1024;

#[derive(Debug)]
pub(crate) struct ScanWindow {
    buf: Vec<u8>,
    start: u64,
    capacity: usize,
}

impl ScanWindow {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::new(),
            start: 0,
            capacity: capacity.max(1),
        }
    }

    /// Drop cached bytes. Must be called after the container is written.
    pub(crate) fn invalidate(&mut self) {
        self.buf.clear();
        self.start = 0;
    }

    fn end(&self) -> u64 {
        self.start + self.buf.len() as u64
    }

    fn contains(&self, offset: u64, len: u64) -> bool {
        offset >= self.start && offset + len <= self.end()
    }

    /// Exactly `len` bytes at `offset`, or `None` if they would extend past
    /// `limit`.
    pub(crate) fn read<R: Read + Seek>(
        &mut self,
        src: &mut R,
        offset: u64,
        len: usize,
        limit: u64,
    ) -> io::Result<Option<&[u8]>> {
        let end = match offset.checked_add(len as u64) {
            Some(end) if end <= limit => end,
            _ => return Ok(None),
        };

        if !self.contains(offset, len as u64) {
            self.fill(src, offset, len.max(self.capacity), limit)?;
        }

        let rel = (offset - self.start) as usize;
        let rel_end = (end - self.start) as usize;
        Ok(Some(&self.buf[rel..rel_end]))
    }

    /// All cached bytes from `offset`, refilling when fewer than `min_len`
    /// are available. The caller guarantees `offset + min_len <= limit`.
    pub(crate) fn read_available<R: Read + Seek>(
        &mut self,
        src: &mut R,
        offset: u64,
        min_len: usize,
        limit: u64,
    ) -> io::Result<&[u8]> {
        if !self.contains(offset, min_len as u64) {
            self.fill(src, offset, min_len.max(self.capacity), limit)?;
        }

        let rel = (offset - self.start) as usize;
        Ok(&self.buf[rel..])
    }

    fn fill<R: Read + Seek>(
        &mut self,
        src: &mut R,
        offset: u64,
        want: usize,
        limit: u64,
    ) -> io::Result<()> {
        let available = limit.saturating_sub(offset);
        let len = (want as u64).min(available) as usize;

        self.buf.resize(len, 0);
        src.seek(SeekFrom::Start(offset))?;
        if let Err(e) = src.read_exact(&mut self.buf) {
            self.invalidate();
            return Err(e);
        }
        self.start = offset;
        Ok(())
    }
}
