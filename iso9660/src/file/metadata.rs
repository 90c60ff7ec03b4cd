//! File metadata extraction

use crate::types::FileRecord;
use core::ops::Range;

impl FileRecord {
    /// Get file name as string
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get file extension
    pub fn extension(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(_, ext)| ext).filter(|e| !e.is_empty())
    }

    /// Is this a regular file?
    pub fn is_file(&self) -> bool {
        !self.flags.directory
    }

    /// Is this a directory?
    pub fn is_directory(&self) -> bool {
        self.flags.directory
    }

    /// Is this hidden?
    pub fn is_hidden(&self) -> bool {
        self.flags.hidden
    }

    /// First LBA of the data
    pub fn extent_lba(&self) -> Option<u32> {
        self.extents.first().map(|e| e.lba)
    }

    /// Byte ranges within the volume, one per extent, in file order
    pub fn byte_ranges(&self) -> impl Iterator<Item = Range<u64>> + '_ {
        self.extents.iter().map(|e| e.byte_range())
    }
}
