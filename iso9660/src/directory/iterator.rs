//! Directory iteration
//!
//! Iterator for reading directory records sequentially, "." and ".." included.

use crate::directory::record::DirectoryRecord;
use crate::error::Result;
use crate::file::extent::Extent;
use crate::store::SectorStore;
use crate::types::SECTOR_SIZE;
use alloc::boxed::Box;

/// Directory iterator
///
/// A zero length byte means the rest of the block is padding. The iterator
/// stops at the first error.
pub struct DirectoryIterator<'a, S: SectorStore + ?Sized> {
    store: &'a mut S,
    extent: Extent,
    offset: u64,
    current_sector: Box<[u8; SECTOR_SIZE]>,
    current_sector_lba: Option<u64>,
    failed: bool,
}

impl<'a, S: SectorStore + ?Sized> DirectoryIterator<'a, S> {
    /// Create new directory iterator over `extent`
    pub fn new(store: &'a mut S, extent: Extent) -> Self {
        Self {
            store,
            extent,
            offset: 0,
            current_sector: Box::new([0u8; SECTOR_SIZE]),
            current_sector_lba: None,
            failed: false,
        }
    }

    fn next_record(&mut self) -> Result<Option<DirectoryRecord>> {
        let sector = SECTOR_SIZE as u64;
        loop {
            if self.offset >= self.extent.length as u64 {
                return Ok(None);
            }

            let block = self.offset / sector;
            let lba = self.extent.lba as u64 + block;
            let in_block = (self.offset % sector) as usize;

            if self.current_sector_lba != Some(lba) {
                self.store.read_sectors(lba, &mut self.current_sector[..])?;
                self.current_sector_lba = Some(lba);
            }

            // Records may not run past the block or the declared data length
            let block_end = (self.extent.length as u64 - block * sector).min(sector) as usize;
            let data = &self.current_sector[in_block..block_end];

            if data.is_empty() || data[0] == 0 {
                self.offset = (block + 1) * sector;
                continue;
            }

            let absolute = lba * sector + in_block as u64;
            let (record, length) = DirectoryRecord::parse(data, absolute)?;
            log::trace!(
                "directory record at {}: {:?} -> LBA {}",
                absolute,
                record.name(),
                record.extent_lba
            );
            self.offset += length as u64;
            return Ok(Some(record));
        }
    }
}

impl<'a, S: SectorStore + ?Sized> Iterator for DirectoryIterator<'a, S> {
    type Item = Result<DirectoryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_record() {
            Ok(record) => record.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
