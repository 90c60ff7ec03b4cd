//! File reader implementation

use crate::error::Result;
use crate::store::SectorStore;
use crate::types::{FileRecord, SECTOR_SIZE};

/// Buffered file reader for streaming large files
///
/// Provides a seek/read interface for files that may be too large to load
/// entirely into memory. Multi-extent files read as one byte stream.
pub struct FileReader<'a, S: SectorStore + ?Sized> {
    store: &'a mut S,
    file: FileRecord,
    position: u64,
    sector: [u8; SECTOR_SIZE],
    sector_lba: Option<u64>,
}

impl<'a, S: SectorStore + ?Sized> FileReader<'a, S> {
    /// Create new file reader
    pub fn new(store: &'a mut S, file: FileRecord) -> Self {
        Self {
            store,
            file,
            position: 0,
            sector: [0u8; SECTOR_SIZE],
            sector_lba: None,
        }
    }

    /// Volume LBA holding file offset `pos` and the offset within that sector
    fn locate(&self, pos: u64) -> Option<(u64, usize, usize)> {
        let mut start = 0u64;
        for extent in &self.file.extents {
            let end = start + extent.length as u64;
            if pos < end {
                let within = pos - start;
                let lba = extent.lba as u64 + within / SECTOR_SIZE as u64;
                let offset = (within % SECTOR_SIZE as u64) as usize;
                // Bytes of this extent left in the sector
                let left = ((end - pos) as usize).min(SECTOR_SIZE - offset);
                return Some((lba, offset, left));
            }
            start = end;
        }
        None
    }

    /// Read bytes from current position
    ///
    /// Returns number of bytes read (may be less than buffer size at EOF)
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut bytes_read = 0;

        while bytes_read < buffer.len() {
            let Some((lba, offset, left)) = self.locate(self.position) else {
                break;
            };
            if self.sector_lba != Some(lba) {
                self.store.read_sectors(lba, &mut self.sector)?;
                self.sector_lba = Some(lba);
            }

            let chunk = left.min(buffer.len() - bytes_read);
            buffer[bytes_read..bytes_read + chunk]
                .copy_from_slice(&self.sector[offset..offset + chunk]);
            bytes_read += chunk;
            self.position += chunk as u64;
        }

        Ok(bytes_read)
    }

    /// Seek to absolute position
    pub fn seek(&mut self, pos: u64) {
        self.position = pos.min(self.file.size);
    }

    /// Seek relative to current position
    pub fn seek_relative(&mut self, offset: i64) {
        let new_pos = if offset < 0 {
            self.position.saturating_sub(offset.unsigned_abs())
        } else {
            self.position.saturating_add(offset as u64)
        };
        self.position = new_pos.min(self.file.size);
    }

    /// Get current position
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Get file size
    pub fn size(&self) -> u64 {
        self.file.size
    }

    /// Check if at end of file
    pub fn is_eof(&self) -> bool {
        self.position >= self.file.size
    }

    /// Get remaining bytes
    pub fn remaining(&self) -> u64 {
        self.file.size.saturating_sub(self.position)
    }
}

#[cfg(feature = "std")]
impl<'a, S: SectorStore + ?Sized> std::io::Read for FileReader<'a, S> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        FileReader::read(self, buf).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
