//! Extent allocation
//!
//! The sizing pass measures every structure, the assignment pass hands out
//! contiguous LBAs in a fixed order. Nothing is written here; the result is
//! an immutable [`Layout`] the writer consumes.

use crate::boot::catalog::BootCatalog;
use crate::build::options::BuildOptions;
use crate::directory::path_table::PathTable;
use crate::directory::record::DirectoryRecord;
use crate::directory::tree::{DirectoryTree, NodeId};
use crate::directory::writer::packed_size;
use crate::error::{Iso9660Error, Result};
use crate::file::extent::Extent;
use crate::types::{MAX_EXTENT_LENGTH, SECTOR_SIZE, SYSTEM_AREA_SECTORS};
use crate::utils::sector::sectors_for_bytes;
use crate::utils::string::file_identifier_bytes;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

/// Something that occupies blocks in the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Entity {
    /// LBA 0-15
    SystemArea,
    /// Primary descriptor, boot record and terminator
    VolumeDescriptors,
    /// Little-endian path table
    TypeLPathTable,
    /// Big-endian path table
    TypeMPathTable,
    /// Directory extent
    Directory(NodeId),
    /// File data
    File(NodeId),
    /// El Torito boot catalog
    BootCatalog,
}

/// Blocks assigned to one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    /// First block
    pub lba: u32,
    /// Number of blocks
    pub blocks: u32,
    /// Length in bytes (the recorded data length)
    pub length: u64,
}

impl Allocation {
    /// One past the last block
    pub fn end(&self) -> u32 {
        self.lba + self.blocks
    }

    /// Directory-record extents: one per `MAX_EXTENT_LENGTH` chunk
    ///
    /// Empty data still yields one zero-length extent.
    pub fn extents(&self) -> Vec<Extent> {
        let chunk_blocks = (MAX_EXTENT_LENGTH / SECTOR_SIZE as u64) as u32;
        let mut extents = Vec::new();
        let mut remaining = self.length;
        let mut lba = self.lba;
        loop {
            let length = remaining.min(MAX_EXTENT_LENGTH);
            extents.push(Extent::new(lba, length as u32));
            remaining -= length;
            lba += chunk_blocks;
            if remaining == 0 {
                return extents;
            }
        }
    }
}

/// Result of the allocator: where everything goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    allocations: BTreeMap<Entity, Allocation>,
    directory_order: Vec<NodeId>,
    file_order: Vec<NodeId>,
    path_table_size: u32,
    descriptor_count: u32,
    total_blocks: u32,
}

impl Layout {
    /// Allocation of `entity`, if it is part of the image
    pub fn get(&self, entity: Entity) -> Option<Allocation> {
        self.allocations.get(&entity).copied()
    }

    /// Allocation that must exist once planning succeeded
    pub(crate) fn require(&self, entity: Entity) -> Result<Allocation> {
        self.get(entity).ok_or(Iso9660Error::NotFound)
    }

    /// Every allocation, sorted by LBA
    pub fn allocations(&self) -> Vec<(Entity, Allocation)> {
        let mut all: Vec<_> = self.allocations.iter().map(|(e, a)| (*e, *a)).collect();
        all.sort_by_key(|(_, a)| (a.lba, a.blocks));
        all
    }

    /// Directories in path table order
    pub fn directory_order(&self) -> &[NodeId] {
        &self.directory_order
    }

    /// Files in the order their data is written, boot images last
    pub fn file_order(&self) -> &[NodeId] {
        &self.file_order
    }

    /// Path table size in bytes
    pub fn path_table_size(&self) -> u32 {
        self.path_table_size
    }

    /// Number of volume descriptors including the terminator
    pub fn descriptor_count(&self) -> u32 {
        self.descriptor_count
    }

    /// Volume space size in blocks
    pub fn total_blocks(&self) -> u32 {
        self.total_blocks
    }
}

/// Sequential block allocator
///
/// Hands out contiguous ranges from a cursor that only moves forward.
#[derive(Debug, Default)]
pub struct ExtentAllocator {
    cursor: u64,
    allocations: BTreeMap<Entity, Allocation>,
}

impl ExtentAllocator {
    /// Allocator starting at LBA 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Next free block
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Reserve whole blocks for `length` bytes
    ///
    /// Empty entities take no blocks and are recorded at LBA 0.
    pub fn allocate(&mut self, entity: Entity, length: u64) -> Result<Allocation> {
        let blocks = sectors_for_bytes(length);
        let end = self.cursor + blocks;
        if end > u32::MAX as u64 {
            return Err(Iso9660Error::VolumeOverflow {
                required: end,
                available: u32::MAX as u64,
            });
        }
        let allocation = Allocation {
            lba: if blocks == 0 { 0 } else { self.cursor as u32 },
            blocks: blocks as u32,
            length,
        };
        self.cursor = end;
        self.allocations.insert(entity, allocation);
        log::trace!(
            "allocated {:?}: LBA {} x {} ({} bytes)",
            entity,
            allocation.lba,
            allocation.blocks,
            length
        );
        Ok(allocation)
    }

    /// Plan the whole image for `tree`
    pub fn plan(tree: &DirectoryTree, options: &BuildOptions) -> Result<Layout> {
        let mut allocator = Self::new();

        // Sizing pass
        let directory_order = tree.directories_breadth_first();
        let path_table_size = PathTable::build(tree, &directory_order, |_| 0)?.size();
        let directory_sizes: Vec<u64> = directory_order
            .iter()
            .map(|&dir| packed_size(directory_record_lengths(tree, dir, options)))
            .collect();
        let has_boot = !tree.boot_images().is_empty();
        if has_boot {
            let catalog_entries = boot_catalog_entry_count(tree);
            if catalog_entries > BootCatalog::MAX_ENTRIES {
                return Err(Iso9660Error::InvalidBootImage(
                    "too many boot images for one catalog sector",
                ));
            }
        }
        let descriptor_count = if has_boot { 3 } else { 2 };

        // Assignment pass
        allocator.allocate(Entity::SystemArea, SYSTEM_AREA_SECTORS as u64 * SECTOR_SIZE as u64)?;
        allocator.allocate(Entity::VolumeDescriptors, descriptor_count * SECTOR_SIZE as u64)?;
        allocator.allocate(Entity::TypeLPathTable, path_table_size as u64)?;
        allocator.allocate(Entity::TypeMPathTable, path_table_size as u64)?;
        for (&dir, &size) in directory_order.iter().zip(&directory_sizes) {
            allocator.allocate(Entity::Directory(dir), size)?;
        }

        let mut file_order = Vec::new();
        for &dir in &directory_order {
            for child in tree.sorted_children(dir) {
                if tree.node(child).is_directory() || tree.is_boot_image(child) {
                    continue;
                }
                allocator.allocate(Entity::File(child), tree.file_len(child))?;
                file_order.push(child);
            }
        }
        if has_boot {
            allocator.allocate(Entity::BootCatalog, SECTOR_SIZE as u64)?;
            for spec in tree.boot_images() {
                allocator.allocate(Entity::File(spec.file), tree.file_len(spec.file))?;
                file_order.push(spec.file);
            }
        }

        let total = allocator.cursor;
        if let Some(limit) = options.volume_space_limit {
            if total > limit {
                return Err(Iso9660Error::VolumeOverflow {
                    required: total,
                    available: limit,
                });
            }
        }
        log::debug!(
            "layout: {} directories, {} files, {} blocks",
            directory_order.len(),
            file_order.len(),
            total
        );

        Ok(Layout {
            allocations: allocator.allocations,
            directory_order,
            file_order,
            path_table_size,
            descriptor_count: descriptor_count as u32,
            total_blocks: total as u32,
        })
    }
}

/// Number of directory records a file of `len` bytes needs
pub fn extent_count(len: u64) -> usize {
    len.div_ceil(MAX_EXTENT_LENGTH).max(1) as usize
}

/// Encoded lengths of the records of `dir`, "." and ".." first
pub fn directory_record_lengths(
    tree: &DirectoryTree,
    dir: NodeId,
    options: &BuildOptions,
) -> Vec<usize> {
    let mut lengths = Vec::new();
    lengths.push(DirectoryRecord::length_for(1));
    lengths.push(DirectoryRecord::length_for(1));
    for child in tree.sorted_children(dir) {
        let node = tree.node(child);
        if node.is_directory() {
            lengths.push(DirectoryRecord::length_for(node.name().len()));
        } else {
            let id_len = file_identifier_bytes(node.name(), options.version_suffix).len();
            let count = extent_count(tree.file_len(child));
            lengths.extend(core::iter::repeat(DirectoryRecord::length_for(id_len)).take(count));
        }
    }
    lengths
}

fn boot_catalog_entry_count(tree: &DirectoryTree) -> usize {
    let rest = tree.boot_images().get(1..).unwrap_or(&[]);
    // A section per run of one platform
    let sections = rest
        .iter()
        .enumerate()
        .filter(|&(i, spec)| i == 0 || rest[i - 1].platform != spec.platform)
        .count();
    // validation + default + one header per section + section entries
    2 + sections + rest.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BootPlatform;
    use alloc::vec;

    fn sample_tree() -> DirectoryTree {
        let mut tree = DirectoryTree::new();
        let root = tree.root();
        tree.create_file(root, "A.TXT", b"hello world".to_vec()).unwrap();
        let sub = tree.create_dir(root, "SUB").unwrap();
        tree.create_file(sub, "B.TXT", b"hello".to_vec()).unwrap();
        tree
    }

    #[test]
    fn test_fixed_order() {
        let tree = sample_tree();
        let layout = ExtentAllocator::plan(&tree, &BuildOptions::default()).unwrap();
        let sub = tree.find("/SUB").unwrap();
        let a = tree.find("/A.TXT").unwrap();
        let b = tree.find("/SUB/B.TXT").unwrap();

        assert_eq!(layout.get(Entity::SystemArea).unwrap().lba, 0);
        assert_eq!(layout.get(Entity::VolumeDescriptors).unwrap().lba, 16);
        assert_eq!(layout.get(Entity::TypeLPathTable).unwrap().lba, 18);
        assert_eq!(layout.get(Entity::TypeMPathTable).unwrap().lba, 19);
        assert_eq!(layout.get(Entity::Directory(tree.root())).unwrap().lba, 20);
        assert_eq!(layout.get(Entity::Directory(sub)).unwrap().lba, 21);
        assert_eq!(layout.get(Entity::File(a)).unwrap().lba, 22);
        assert_eq!(layout.get(Entity::File(b)).unwrap().lba, 23);
        assert_eq!(layout.total_blocks(), 24);
        assert_eq!(layout.path_table_size(), 10 + 12);
        assert_eq!(layout.file_order(), &[a, b]);
    }

    #[test]
    fn test_allocations_do_not_overlap() {
        let tree = sample_tree();
        let layout = ExtentAllocator::plan(&tree, &BuildOptions::default()).unwrap();
        let all = layout.allocations();
        for pair in all.windows(2) {
            assert!(pair[0].1.end() <= pair[1].1.lba);
        }
    }

    #[test]
    fn test_volume_limit() {
        let tree = sample_tree();
        let options = BuildOptions {
            volume_space_limit: Some(20),
            ..BuildOptions::default()
        };
        assert_eq!(
            ExtentAllocator::plan(&tree, &options),
            Err(Iso9660Error::VolumeOverflow {
                required: 24,
                available: 20
            })
        );
    }

    #[test]
    fn test_empty_file_at_lba_zero() {
        let mut tree = sample_tree();
        let root = tree.root();
        let empty = tree.create_file(root, "ZZ.TXT", Vec::new()).unwrap();
        let layout = ExtentAllocator::plan(&tree, &BuildOptions::default()).unwrap();
        let allocation = layout.get(Entity::File(empty)).unwrap();
        assert_eq!(allocation.lba, 0);
        assert_eq!(allocation.blocks, 0);
        assert_eq!(allocation.extents(), vec![Extent::new(0, 0)]);
        assert_eq!(layout.total_blocks(), 24);
    }

    #[test]
    fn test_boot_images_after_catalog() {
        let mut tree = sample_tree();
        let root = tree.root();
        let image = tree.create_file(root, "BOOT.IMG", vec![0u8; 4096]).unwrap();
        tree.attach_boot_image(image, BootPlatform::X86).unwrap();
        let layout = ExtentAllocator::plan(&tree, &BuildOptions::default()).unwrap();
        assert_eq!(layout.descriptor_count(), 3);
        let catalog = layout.get(Entity::BootCatalog).unwrap();
        let boot = layout.get(Entity::File(image)).unwrap();
        assert_eq!(boot.lba, catalog.end());
        assert_eq!(boot.blocks, 2);
        assert_eq!(layout.total_blocks(), boot.end());
    }

    #[test]
    fn test_multi_extent_split() {
        let allocation = Allocation {
            lba: 100,
            blocks: sectors_for_bytes(MAX_EXTENT_LENGTH + 10) as u32,
            length: MAX_EXTENT_LENGTH + 10,
        };
        let extents = allocation.extents();
        assert_eq!(extents.len(), 2);
        assert_eq!(extents[0], Extent::new(100, MAX_EXTENT_LENGTH as u32));
        assert_eq!(extents[1].lba, 100 + (MAX_EXTENT_LENGTH / 2048) as u32);
        assert_eq!(extents[1].length, 10);
        assert_eq!(extent_count(0), 1);
        assert_eq!(extent_count(MAX_EXTENT_LENGTH), 1);
    }
}
