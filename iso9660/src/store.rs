//! Sector storage
//!
//! Everything the codec reads or writes goes through [`SectorStore`], a linear
//! run of 2048-byte logical blocks. [`BlockIoStore`] maps it onto any
//! `gpt_disk_io::BlockIo` device, [`MemoryStore`] keeps the image in RAM.

use crate::error::{Iso9660Error, Result};
use crate::types::SECTOR_SIZE;
use alloc::format;
use alloc::vec;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;

/// Random access to 2048-byte logical blocks
pub trait SectorStore {
    /// Number of logical blocks the store can address
    fn sector_count(&mut self) -> Result<u64>;

    /// Read whole sectors starting at `lba`; `dst` must be a multiple of 2048 bytes
    fn read_sectors(&mut self, lba: u64, dst: &mut [u8]) -> Result<()>;

    /// Write whole sectors starting at `lba`; `src` must be a multiple of 2048 bytes
    fn write_sectors(&mut self, lba: u64, src: &[u8]) -> Result<()>;

    /// Largest image the store can hold, `None` when it grows on demand
    fn capacity(&mut self) -> Result<Option<u64>> {
        self.sector_count().map(Some)
    }

    /// Flush pending writes
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Read `count` sectors into a new buffer
    fn read(&mut self, lba: u64, count: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; count * SECTOR_SIZE];
        self.read_sectors(lba, &mut buf)?;
        Ok(buf)
    }
}

impl<S: SectorStore + ?Sized> SectorStore for &mut S {
    fn sector_count(&mut self) -> Result<u64> {
        (**self).sector_count()
    }

    fn capacity(&mut self) -> Result<Option<u64>> {
        (**self).capacity()
    }

    fn read_sectors(&mut self, lba: u64, dst: &mut [u8]) -> Result<()> {
        (**self).read_sectors(lba, dst)
    }

    fn write_sectors(&mut self, lba: u64, src: &[u8]) -> Result<()> {
        (**self).write_sectors(lba, src)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

fn check_aligned(len: usize) -> Result<()> {
    if len % SECTOR_SIZE != 0 {
        return Err(Iso9660Error::UnalignedBuffer(len));
    }
    Ok(())
}

fn out_of_range(lba: u64) -> Iso9660Error {
    Iso9660Error::Io {
        lba: Some(lba),
        message: "sector out of range".into(),
    }
}

/// ISO sectors on top of a block device
///
/// `start_block` is the device block where the image begins (0 for a raw
/// image, the partition start for an embedded one).
pub struct BlockIoStore<B: BlockIo> {
    inner: B,
    start_block: u64,
    blocks_per_sector: u64,
}

impl<B: BlockIo> BlockIoStore<B> {
    /// Wrap `inner`; its block size must divide 2048
    pub fn new(inner: B, start_block: u64) -> Result<Self> {
        let block_size = inner.block_size().to_u64();
        if block_size == 0 || SECTOR_SIZE as u64 % block_size != 0 {
            return Err(Iso9660Error::UnsupportedBlockSize(block_size as u32));
        }
        Ok(Self {
            inner,
            start_block,
            blocks_per_sector: SECTOR_SIZE as u64 / block_size,
        })
    }

    /// Give back the device
    pub fn into_inner(self) -> B {
        self.inner
    }

    fn device_lba(&self, lba: u64) -> Lba {
        Lba(self.start_block + lba * self.blocks_per_sector)
    }
}

impl<B: BlockIo> SectorStore for BlockIoStore<B> {
    fn sector_count(&mut self) -> Result<u64> {
        let blocks = self.inner.num_blocks().map_err(|e| Iso9660Error::Io {
            lba: None,
            message: format!("{}", e),
        })?;
        Ok(blocks.saturating_sub(self.start_block) / self.blocks_per_sector)
    }

    fn read_sectors(&mut self, lba: u64, dst: &mut [u8]) -> Result<()> {
        check_aligned(dst.len())?;
        let at = self.device_lba(lba);
        self.inner.read_blocks(at, dst).map_err(|e| Iso9660Error::Io {
            lba: Some(lba),
            message: format!("{}", e),
        })
    }

    fn write_sectors(&mut self, lba: u64, src: &[u8]) -> Result<()> {
        check_aligned(src.len())?;
        let at = self.device_lba(lba);
        self.inner.write_blocks(at, src).map_err(|e| Iso9660Error::Io {
            lba: Some(lba),
            message: format!("{}", e),
        })
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(|e| Iso9660Error::Io {
            lba: None,
            message: format!("{}", e),
        })
    }
}

/// Growable in-memory image
///
/// Writes past the end extend the image; reads past the end fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    data: Vec<u8>,
}

impl MemoryStore {
    /// Empty image
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing image bytes (a trailing partial sector is zero-padded)
    pub fn from_vec(mut data: Vec<u8>) -> Self {
        let padded = data.len().div_ceil(SECTOR_SIZE) * SECTOR_SIZE;
        data.resize(padded, 0);
        Self { data }
    }

    /// Image bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Take the image bytes
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl SectorStore for MemoryStore {
    fn sector_count(&mut self) -> Result<u64> {
        Ok((self.data.len() / SECTOR_SIZE) as u64)
    }

    fn capacity(&mut self) -> Result<Option<u64>> {
        Ok(None)
    }

    fn read_sectors(&mut self, lba: u64, dst: &mut [u8]) -> Result<()> {
        check_aligned(dst.len())?;
        let start = usize::try_from(lba)
            .ok()
            .and_then(|l| l.checked_mul(SECTOR_SIZE))
            .ok_or_else(|| out_of_range(lba))?;
        let src = self
            .data
            .get(start..start + dst.len())
            .ok_or_else(|| out_of_range(lba))?;
        dst.copy_from_slice(src);
        Ok(())
    }

    fn write_sectors(&mut self, lba: u64, src: &[u8]) -> Result<()> {
        check_aligned(src.len())?;
        let start = usize::try_from(lba)
            .ok()
            .and_then(|l| l.checked_mul(SECTOR_SIZE))
            .ok_or_else(|| out_of_range(lba))?;
        let end = start + src.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(src);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_grows_on_write() {
        let mut store = MemoryStore::new();
        store.write_sectors(2, &[7u8; SECTOR_SIZE]).unwrap();
        assert_eq!(store.sector_count().unwrap(), 3);
        assert_eq!(store.read(2, 1).unwrap(), vec![7u8; SECTOR_SIZE]);
        assert_eq!(store.read(0, 1).unwrap(), vec![0u8; SECTOR_SIZE]);
    }

    #[test]
    fn test_memory_store_rejects_partial_sectors() {
        let mut store = MemoryStore::from_vec(vec![0u8; 100]);
        assert_eq!(store.sector_count().unwrap(), 1);
        let mut buf = [0u8; 512];
        assert_eq!(
            store.read_sectors(0, &mut buf),
            Err(Iso9660Error::UnalignedBuffer(512))
        );
        assert!(matches!(
            store.read(1, 1),
            Err(Iso9660Error::Io { lba: Some(1), .. })
        ));
    }
}
