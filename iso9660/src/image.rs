//! Whole-image decoding

use crate::boot::catalog::BootCatalog;
use crate::boot::BootImageSpec;
use crate::build::options::ParseOptions;
use crate::directory::path_table::PathTable;
use crate::directory::tree::{DirectoryTree, NodeId};
use crate::error::Result;
use crate::store::SectorStore;
use crate::types::{VolumeInfo, SECTOR_SIZE};
use crate::utils::string::NamePolicy;
use crate::volume::VolumeDescriptorSet;

/// A decoded volume
#[derive(Debug)]
pub struct IsoImage {
    /// Descriptors from LBA 16 to the terminator
    pub descriptors: VolumeDescriptorSet,
    /// Summary of the primary descriptor
    pub volume: VolumeInfo,
    /// Type L path table (checked against type M when requested)
    pub path_table: PathTable,
    /// Directory hierarchy; file content refers back to the store
    pub tree: DirectoryTree,
    /// El Torito catalog, if the volume has one and it was requested
    pub boot_catalog: Option<BootCatalog>,
}

impl IsoImage {
    /// Non-empty file whose data starts at `lba`
    pub fn file_at(&self, lba: u32) -> Option<NodeId> {
        self.tree.walk().find(|&id| {
            let node = self.tree.node(id);
            !node.is_directory() && node.extent().is_some_and(|e| e.lba == lba && e.length > 0)
        })
    }
}

/// Decode the volume held by `store`
///
/// Names are read with the relaxed (level 2) policy so volumes written by
/// other tools still load.
pub fn read_image<S: SectorStore + ?Sized>(store: &mut S, options: &ParseOptions) -> Result<IsoImage> {
    let descriptors = VolumeDescriptorSet::parse(store)?;
    let volume = descriptors.info()?;
    let path_table = PathTable::read_verified(store, &volume, options.verify_path_tables)?;
    let root = descriptors.primary()?.root_directory_record.clone();
    let tree = DirectoryTree::parse(store, &root, NamePolicy::Level2)?;
    if options.verify_path_tables {
        path_table.check_tree(&tree, volume.type_l_path_table as u64 * SECTOR_SIZE as u64)?;
    }

    let mut image = IsoImage {
        descriptors,
        volume,
        path_table,
        tree,
        boot_catalog: None,
    };

    if options.resolve_boot_catalog {
        if let Some(lba) = image.volume.boot_catalog_lba {
            let catalog = BootCatalog::read(store, lba)?;
            for boot in catalog.images() {
                let Some(file) = image.file_at(boot.load_rba) else {
                    log::warn!("boot image at LBA {} has no directory entry", boot.load_rba);
                    continue;
                };
                image.tree.link_boot_image(BootImageSpec {
                    file,
                    platform: boot.platform,
                    media_type: boot.media_type,
                    load_segment: boot.load_segment,
                    system_type: boot.system_type,
                    sector_count: Some(boot.sector_count),
                    bootable: boot.bootable,
                    boot_info_table: false,
                });
            }
            image.boot_catalog = Some(catalog);
        }
    }

    log::info!(
        "read volume {:?}: {} blocks, {} nodes",
        image.volume.volume_id,
        image.volume.volume_space_size,
        image.tree.len()
    );
    Ok(image)
}
