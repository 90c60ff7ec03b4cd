//! File extent management
//!
//! Extents represent contiguous data regions on disk.

use crate::types::SECTOR_SIZE;

/// File extent (contiguous data region)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent {
    /// Starting LBA
    pub lba: u32,

    /// Length in bytes
    pub length: u32,
}

impl Extent {
    /// Create new extent
    pub fn new(lba: u32, length: u32) -> Self {
        Self { lba, length }
    }

    /// Number of sectors (2048 bytes each)
    pub fn sector_count(&self) -> u32 {
        self.length.div_ceil(SECTOR_SIZE as u32)
    }

    /// End LBA (exclusive)
    pub fn end_lba(&self) -> u32 {
        self.lba + self.sector_count()
    }

    /// Byte range `[lba * 2048, + length)` within the volume
    pub fn byte_range(&self) -> core::ops::Range<u64> {
        let start = self.lba as u64 * SECTOR_SIZE as u64;
        start..start + self.length as u64
    }
}
