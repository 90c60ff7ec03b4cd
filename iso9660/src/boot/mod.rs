//! El Torito boot support
//!
//! Parsing and building boot catalogs and boot images.

pub mod catalog;
pub mod entry;
pub mod info_table;
pub mod platform;
pub mod validation;

use crate::directory::tree::NodeId;
use crate::error::{Iso9660Error, Result};
use crate::store::SectorStore;
use crate::types::{BootImage, BootMediaType, BootPlatform, VolumeInfo};
use catalog::BootCatalog;
use entry::BootEntry;

/// Boot image attached to a file of a [`DirectoryTree`](crate::directory::tree::DirectoryTree)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootImageSpec {
    /// File holding the image
    pub file: NodeId,

    /// Target platform
    pub platform: BootPlatform,

    /// Emulation mode
    pub media_type: BootMediaType,

    /// Load segment (0 = default 0x7C0)
    pub load_segment: u16,

    /// System type byte
    pub system_type: u8,

    /// 512-byte sectors to load; derived from the image length when `None`
    pub sector_count: Option<u16>,

    /// Boot indicator
    pub bootable: bool,

    /// Patch a boot info table into the image
    pub boot_info_table: bool,
}

impl BootImageSpec {
    /// Bootable no-emulation image for `platform`
    pub fn new(file: NodeId, platform: BootPlatform) -> Self {
        Self {
            file,
            platform,
            media_type: BootMediaType::NoEmulation,
            load_segment: 0,
            system_type: 0,
            sector_count: None,
            bootable: true,
            boot_info_table: false,
        }
    }

    /// Sector count written to the catalog for an image of `image_len` bytes
    ///
    /// Emulated media load a single sector; no-emulation images load the
    /// whole image, capped at what the field can hold.
    pub fn effective_sector_count(&self, image_len: u64) -> u16 {
        if let Some(count) = self.sector_count {
            return count;
        }
        if self.media_type.is_emulated() {
            return 1;
        }
        image_len.div_ceil(512).min(u16::MAX as u64) as u16
    }

    /// Catalog entry for this image stored at `load_rba`
    pub fn to_entry(&self, load_rba: u32, image_len: u64) -> BootEntry {
        BootEntry {
            bootable: self.bootable,
            media_type: self.media_type,
            load_segment: self.load_segment,
            system_type: self.system_type,
            sector_count: self.effective_sector_count(image_len),
            load_rba,
        }
    }
}

/// Read the boot catalog named by the volume's boot record
pub fn read_boot_catalog<S: SectorStore + ?Sized>(
    store: &mut S,
    volume: &VolumeInfo,
) -> Result<BootCatalog> {
    let lba = volume.boot_catalog_lba.ok_or(Iso9660Error::NoBootCatalog)?;
    BootCatalog::read(store, lba)
}

/// Find boot image from El Torito boot catalog
///
/// # Arguments
/// * `store` - Sector store holding the volume
/// * `volume` - Mounted volume
///
/// # Returns
/// The initial/default boot entry
pub fn find_boot_image<S: SectorStore + ?Sized>(
    store: &mut S,
    volume: &VolumeInfo,
) -> Result<BootImage> {
    let catalog = read_boot_catalog(store, volume)?;
    let image = catalog
        .default_entry
        .to_boot_image(catalog.validation.platform);
    log::debug!(
        "default boot entry: {:?} at LBA {}, {} sectors",
        image.media_type,
        image.load_rba,
        image.sector_count
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::tree::DirectoryTree;

    #[test]
    fn test_sector_count_defaults() {
        let root = DirectoryTree::new().root();
        let mut spec = BootImageSpec::new(root, BootPlatform::X86);
        assert_eq!(spec.effective_sector_count(2049), 5);
        assert_eq!(spec.effective_sector_count(u64::MAX / 2), u16::MAX);
        spec.media_type = BootMediaType::Floppy144M;
        assert_eq!(spec.effective_sector_count(1_474_560), 1);
        spec.sector_count = Some(8);
        assert_eq!(spec.effective_sector_count(0), 8);
    }
}
