//! Boot info table
//!
//! Patched into a no-emulation boot image at byte 8 so the loader can find
//! the volume without parsing it:
//!
//! ```text
//! 8..12   LBA of the primary volume descriptor (16)
//! 12..16  LBA of the boot image
//! 16..20  boot image length in bytes
//! 20..24  sum of the image's 32-bit LE words from byte 64
//! 24..64  reserved, zero
//! ```

use crate::error::{Iso9660Error, Result};
use crate::types::VOLUME_DESCRIPTOR_START;
use crate::utils::checksum;

/// Decoded boot info table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootInfoTable {
    /// LBA of the primary volume descriptor
    pub pvd_lba: u32,

    /// LBA of the boot image
    pub file_lba: u32,

    /// Boot image length in bytes
    pub file_length: u32,

    /// Checksum of the image from byte 64
    pub checksum: u32,
}

impl BootInfoTable {
    /// Byte offset of the table within the image
    pub const OFFSET: usize = 8;

    /// First byte covered by the checksum
    pub const CHECKSUM_START: usize = 64;

    /// Compute the table for `image` stored at `file_lba`
    pub fn compute(image: &[u8], file_lba: u32) -> Result<Self> {
        if image.len() < Self::CHECKSUM_START {
            return Err(Iso9660Error::InvalidBootImage(
                "boot info table needs an image of at least 64 bytes",
            ));
        }
        Ok(Self {
            pvd_lba: VOLUME_DESCRIPTOR_START as u32,
            file_lba,
            file_length: image.len() as u32,
            checksum: checksum::checksum_32(&image[Self::CHECKSUM_START..]),
        })
    }

    /// Write the table into `image` and zero the reserved bytes
    pub fn apply(&self, image: &mut [u8]) {
        let table = &mut image[Self::OFFSET..Self::CHECKSUM_START];
        table.fill(0);
        table[0..4].copy_from_slice(&self.pvd_lba.to_le_bytes());
        table[4..8].copy_from_slice(&self.file_lba.to_le_bytes());
        table[8..12].copy_from_slice(&self.file_length.to_le_bytes());
        table[12..16].copy_from_slice(&self.checksum.to_le_bytes());
    }

    /// Read the table from a patched image
    pub fn parse(image: &[u8]) -> Option<Self> {
        let table = image.get(Self::OFFSET..Self::OFFSET + 16)?;
        let word = |at: usize| u32::from_le_bytes([table[at], table[at + 1], table[at + 2], table[at + 3]]);
        Some(Self {
            pvd_lba: word(0),
            file_lba: word(4),
            file_length: word(8),
            checksum: word(12),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_patch_image() {
        let mut image = vec![0xFFu8; 2048];
        let table = BootInfoTable::compute(&image, 42).unwrap();
        table.apply(&mut image);
        assert_eq!(&image[8..12], &16u32.to_le_bytes());
        assert_eq!(&image[12..16], &42u32.to_le_bytes());
        assert_eq!(&image[16..20], &2048u32.to_le_bytes());
        assert!(image[24..64].iter().all(|&b| b == 0));
        assert_eq!(&image[..8], &[0xFF; 8]);
        // 496 words of 0xFFFFFFFF
        assert_eq!(table.checksum, 0u32.wrapping_sub(496));
        assert_eq!(BootInfoTable::parse(&image), Some(table));
    }

    #[test]
    fn test_short_image_rejected() {
        assert!(BootInfoTable::compute(&[0u8; 63], 20).is_err());
    }
}
