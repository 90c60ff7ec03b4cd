//! Directory extent packing
//!
//! Records are appended into 2048-byte blocks; a record that would cross a
//! block boundary starts the next block and the gap stays zero.

use crate::directory::record::DirectoryRecord;
use crate::types::SECTOR_SIZE;
use alloc::vec::Vec;

/// Accumulates encoded records for one directory extent
#[derive(Debug, Default)]
pub struct RecordPacker {
    buf: Vec<u8>,
}

impl RecordPacker {
    /// Empty extent
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset the next record of `len` bytes would be placed at
    fn slot(used: usize, len: usize) -> usize {
        let in_block = used % SECTOR_SIZE;
        if in_block + len > SECTOR_SIZE {
            used + (SECTOR_SIZE - in_block)
        } else {
            used
        }
    }

    /// Append one record
    pub fn push(&mut self, record: &DirectoryRecord) {
        let len = record.encoded_len();
        let at = Self::slot(self.buf.len(), len);
        self.buf.resize(at + len, 0);
        record.write_to(&mut self.buf[at..]);
    }

    /// Bytes used so far, padding between blocks included
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Nothing pushed yet
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Zero-pad to whole blocks (at least one)
    pub fn finish(mut self) -> Vec<u8> {
        let blocks = self.buf.len().div_ceil(SECTOR_SIZE).max(1);
        self.buf.resize(blocks * SECTOR_SIZE, 0);
        self.buf
    }
}

/// Size in bytes, whole blocks, of an extent holding records of these lengths
pub fn packed_size(lengths: impl IntoIterator<Item = usize>) -> u64 {
    let used = lengths
        .into_iter()
        .fold(0usize, |used, len| RecordPacker::slot(used, len) + len);
    (used.div_ceil(SECTOR_SIZE).max(1) * SECTOR_SIZE) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::extent::Extent;
    use crate::types::FileFlags;
    use crate::utils::datetime::DateTime7;
    use alloc::format;

    fn file_record(name: &str) -> DirectoryRecord {
        DirectoryRecord::new(
            format!("{};1", name).into_bytes(),
            Extent::new(40, 1),
            FileFlags::default(),
            DateTime7::default(),
        )
    }

    #[test]
    fn test_records_never_span_blocks() {
        let mut packer = RecordPacker::new();
        let mut lengths = Vec::new();
        for i in 0..120 {
            let record = file_record(&format!("FILE{:04}.TXT", i));
            lengths.push(record.encoded_len());
            packer.push(&record);
        }
        let data = packer.finish();
        assert_eq!(data.len() as u64, packed_size(lengths.iter().copied()));
        assert!(data.len() > SECTOR_SIZE);

        // Walk the packed data the way a reader does
        let mut offset = 0;
        let mut seen = 0;
        while offset < data.len() {
            let len = data[offset] as usize;
            if len == 0 {
                offset = (offset / SECTOR_SIZE + 1) * SECTOR_SIZE;
                continue;
            }
            assert_eq!(offset / SECTOR_SIZE, (offset + len - 1) / SECTOR_SIZE);
            offset += len;
            seen += 1;
        }
        assert_eq!(seen, 120);
    }

    #[test]
    fn test_empty_extent_is_one_block() {
        assert_eq!(packed_size([34usize, 34]), 2048);
        assert_eq!(RecordPacker::new().finish().len(), 2048);
    }
}
