//! File reading and extent management

pub mod extent;
pub mod metadata;
pub mod reader;
pub mod source;

use crate::error::{Iso9660Error, Result};
use crate::store::SectorStore;
use crate::types::{FileRecord, SECTOR_SIZE};

/// Read file contents
///
/// # Arguments
/// * `store` - Sector store holding the volume
/// * `file` - File record to read
/// * `buffer` - Buffer to read into (at least `file.size` bytes)
///
/// # Returns
/// Number of bytes read
pub fn read_file<S: SectorStore + ?Sized>(
    store: &mut S,
    file: &FileRecord,
    buffer: &mut [u8],
) -> Result<usize> {
    let file_size = usize::try_from(file.size).map_err(|_| Iso9660Error::ExtentOutOfBounds)?;
    if buffer.len() < file_size {
        return Err(Iso9660Error::ExtentOutOfBounds);
    }

    // Allocate sector buffer once outside the loop
    let mut sector = [0u8; SECTOR_SIZE];
    let mut written = 0usize;

    for extent in &file.extents {
        let mut remaining = extent.length as usize;
        for i in 0..extent.sector_count() as u64 {
            store.read_sectors(extent.lba as u64 + i, &mut sector)?;
            let len = remaining.min(SECTOR_SIZE);
            buffer[written..written + len].copy_from_slice(&sector[..len]);
            written += len;
            remaining -= len;
        }
    }

    Ok(written)
}

/// Read file into new Vec
pub fn read_file_vec<S: SectorStore + ?Sized>(
    store: &mut S,
    file: &FileRecord,
) -> Result<alloc::vec::Vec<u8>> {
    let size = usize::try_from(file.size).map_err(|_| Iso9660Error::ExtentOutOfBounds)?;
    let mut buffer = alloc::vec![0u8; size];
    read_file(store, file, &mut buffer)?;
    Ok(buffer)
}
