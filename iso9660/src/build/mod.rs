//! Image encoding
//!
//! [`write_image`] plans the full layout, validates everything it can without
//! touching the store, then serializes in LBA order: system area, volume
//! descriptors, path tables, directories, file data, boot catalog, boot images.

pub mod layout;
pub mod options;

use crate::boot::catalog::BootCatalog;
use crate::boot::info_table::BootInfoTable;
use crate::directory::path_table::{PathTable, PathTableType};
use crate::directory::record::DirectoryRecord;
use crate::directory::tree::{DirectoryTree, FileContent, NodeId};
use crate::directory::writer::RecordPacker;
use crate::error::{Iso9660Error, Result};
use crate::file::extent::Extent;
use crate::file::source::ByteSource;
use crate::store::{MemoryStore, SectorStore};
use crate::types::{FileFlags, SECTOR_SIZE, SYSTEM_AREA_SECTORS};
use crate::utils::string::file_identifier_bytes;
use crate::volume::boot_record::BootRecordDescriptor;
use crate::volume::primary::PrimaryVolumeDescriptor;
use crate::volume::VolumeDescriptorSet;
use alloc::vec;
use alloc::vec::Vec;
use layout::{Entity, ExtentAllocator, Layout};
use options::BuildOptions;

/// Sectors copied per store write when streaming file data
const COPY_CHUNK_SECTORS: usize = 32;

/// Encode `tree` into `store`
///
/// Nothing is written unless the layout fits the volume limit and the store,
/// every file has a byte source, and every boot image is usable.
pub fn write_image<S: SectorStore + ?Sized>(
    store: &mut S,
    tree: &DirectoryTree,
    options: &BuildOptions,
) -> Result<Layout> {
    options.validate()?;
    let layout = ExtentAllocator::plan(tree, options)?;

    if let Some(capacity) = store.capacity()? {
        if layout.total_blocks() as u64 > capacity {
            return Err(Iso9660Error::VolumeOverflow {
                required: layout.total_blocks() as u64,
                available: capacity,
            });
        }
    }
    let system_area_len = SYSTEM_AREA_SECTORS as usize * SECTOR_SIZE;
    if let Some(payload) = &options.system_area {
        if payload.len() > system_area_len {
            return Err(Iso9660Error::VolumeOverflow {
                required: payload.len().div_ceil(SECTOR_SIZE) as u64,
                available: SYSTEM_AREA_SECTORS as u64,
            });
        }
    }
    for &file in layout.file_order() {
        source_of(tree, file)?;
    }
    for spec in tree.boot_images() {
        if tree.file_len(spec.file) == 0 {
            return Err(Iso9660Error::InvalidBootImage("boot image is empty"));
        }
        if spec.boot_info_table && tree.file_len(spec.file) < BootInfoTable::CHECKSUM_START as u64
        {
            return Err(Iso9660Error::InvalidBootImage(
                "boot info table needs an image of at least 64 bytes",
            ));
        }
    }

    // System area
    let mut system_area = vec![0u8; system_area_len];
    if let Some(payload) = &options.system_area {
        system_area[..payload.len()].copy_from_slice(payload);
    }
    store.write_sectors(0, &system_area)?;

    // Volume descriptors
    let root_alloc = layout.require(Entity::Directory(tree.root()))?;
    let root_record = DirectoryRecord::new(
        vec![DirectoryRecord::SELF_ID],
        Extent::new(root_alloc.lba, root_alloc.length as u32),
        directory_flags(false),
        tree.node(tree.root()).recorded(),
    );
    let type_l = layout.require(Entity::TypeLPathTable)?;
    let type_m = layout.require(Entity::TypeMPathTable)?;
    let pvd = PrimaryVolumeDescriptor {
        system_id: options.system_id.clone(),
        volume_id: options.volume_id.clone(),
        volume_space_size: layout.total_blocks(),
        volume_set_size: 1,
        volume_sequence_number: 1,
        logical_block_size: SECTOR_SIZE as u16,
        path_table_size: layout.path_table_size(),
        type_l_path_table: type_l.lba,
        optional_type_l_path_table: 0,
        type_m_path_table: type_m.lba,
        optional_type_m_path_table: 0,
        root_directory_record: root_record,
        volume_set_id: options.volume_set_id.clone(),
        publisher_id: options.publisher_id.clone(),
        preparer_id: options.preparer_id.clone(),
        application_id: options.application_id.clone(),
        copyright_file_id: options.copyright_file_id.clone(),
        abstract_file_id: options.abstract_file_id.clone(),
        bibliographic_file_id: options.bibliographic_file_id.clone(),
        creation: options.creation,
        modification: options.modification,
        expiration: options.expiration,
        effective: options.effective,
    };
    let boot_record = layout
        .get(Entity::BootCatalog)
        .map(|catalog| BootRecordDescriptor::el_torito(catalog.lba));
    VolumeDescriptorSet::new(pvd, boot_record).write(store)?;

    // Path tables
    let table = PathTable::build(tree, layout.directory_order(), |dir| {
        layout.get(Entity::Directory(dir)).map_or(0, |a| a.lba)
    })?;
    for (allocation, kind) in [
        (type_l, PathTableType::LittleEndian),
        (type_m, PathTableType::BigEndian),
    ] {
        store.write_sectors(allocation.lba as u64, &pad_to_sectors(table.encode(kind)))?;
    }

    // Directories
    for &dir in layout.directory_order() {
        let allocation = layout.require(Entity::Directory(dir))?;
        let data = directory_extent(tree, &layout, dir, options)?;
        debug_assert_eq!(data.len() as u64, allocation.length);
        store.write_sectors(allocation.lba as u64, &data)?;
    }

    // File data and boot images
    for &file in layout.file_order() {
        let allocation = layout.require(Entity::File(file))?;
        let info_table = tree
            .boot_images()
            .iter()
            .any(|spec| spec.file == file && spec.boot_info_table);
        if info_table {
            let mut image = tree.read_file(store, file)?;
            BootInfoTable::compute(&image, allocation.lba)?.apply(&mut image);
            store.write_sectors(allocation.lba as u64, &pad_to_sectors(image))?;
        } else {
            copy_source(store, source_of(tree, file)?, allocation.lba as u64)?;
        }
    }

    if let Some(catalog) = layout.get(Entity::BootCatalog) {
        write_catalog(store, tree, &layout, options, catalog.lba)?;
    }

    store.flush()?;
    log::debug!("wrote image: {} blocks", layout.total_blocks());
    Ok(layout)
}

/// Encode `tree` into a new in-memory image
pub fn build_image(tree: &DirectoryTree, options: &BuildOptions) -> Result<Vec<u8>> {
    let mut store = MemoryStore::new();
    let layout = write_image(&mut store, tree, options)?;
    let mut data = store.into_vec();
    data.resize(layout.total_blocks() as usize * SECTOR_SIZE, 0);
    Ok(data)
}

fn directory_flags(hidden: bool) -> FileFlags {
    FileFlags {
        directory: true,
        hidden,
        ..FileFlags::default()
    }
}

fn source_of(tree: &DirectoryTree, file: NodeId) -> Result<&dyn ByteSource> {
    match tree.file_content(file) {
        Some(FileContent::Source(source)) => Ok(source.as_ref()),
        _ => Err(Iso9660Error::MissingSource),
    }
}

fn pad_to_sectors(mut data: Vec<u8>) -> Vec<u8> {
    let padded = data.len().div_ceil(SECTOR_SIZE) * SECTOR_SIZE;
    data.resize(padded, 0);
    data
}

/// Records of one directory packed into its extent
fn directory_extent(
    tree: &DirectoryTree,
    layout: &Layout,
    dir: NodeId,
    options: &BuildOptions,
) -> Result<Vec<u8>> {
    let extent_of = |id: NodeId| -> Result<Extent> {
        let a = layout.require(Entity::Directory(id))?;
        Ok(Extent::new(a.lba, a.length as u32))
    };
    let node = tree.node(dir);
    let parent = tree.parent(dir).unwrap_or(dir);

    let mut packer = RecordPacker::new();
    packer.push(&DirectoryRecord::new(
        vec![DirectoryRecord::SELF_ID],
        extent_of(dir)?,
        directory_flags(false),
        node.recorded(),
    ));
    packer.push(&DirectoryRecord::new(
        vec![DirectoryRecord::PARENT_ID],
        extent_of(parent)?,
        directory_flags(false),
        tree.node(parent).recorded(),
    ));

    for child in tree.sorted_children(dir) {
        let child_node = tree.node(child);
        if child_node.is_directory() {
            packer.push(&DirectoryRecord::new(
                child_node.name().as_bytes().to_vec(),
                extent_of(child)?,
                directory_flags(child_node.is_hidden()),
                child_node.recorded(),
            ));
            continue;
        }

        let identifier = file_identifier_bytes(child_node.name(), options.version_suffix);
        let extents = layout.require(Entity::File(child))?.extents();
        let last = extents.len() - 1;
        for (i, extent) in extents.into_iter().enumerate() {
            let flags = FileFlags {
                hidden: child_node.is_hidden(),
                not_final: i != last,
                ..FileFlags::default()
            };
            packer.push(&DirectoryRecord::new(
                identifier.clone(),
                extent,
                flags,
                child_node.recorded(),
            ));
        }
    }

    Ok(packer.finish())
}

fn write_catalog<S: SectorStore + ?Sized>(
    store: &mut S,
    tree: &DirectoryTree,
    layout: &Layout,
    options: &BuildOptions,
    lba: u32,
) -> Result<()> {
    let mut images = Vec::with_capacity(tree.boot_images().len());
    for spec in tree.boot_images() {
        let allocation = layout.require(Entity::File(spec.file))?;
        images.push((spec.platform, spec.to_entry(allocation.lba, allocation.length)));
    }
    let catalog = BootCatalog::from_images(&options.catalog_id, &images)?;
    store.write_sectors(lba as u64, &catalog.to_bytes())
}

fn copy_source<S: SectorStore + ?Sized>(
    store: &mut S,
    source: &dyn ByteSource,
    lba: u64,
) -> Result<()> {
    let len = source.len();
    let chunk = (COPY_CHUNK_SECTORS * SECTOR_SIZE) as u64;
    let mut buf = vec![0u8; COPY_CHUNK_SECTORS * SECTOR_SIZE];
    let mut offset = 0u64;

    while offset < len {
        let take = (len - offset).min(chunk) as usize;
        let sectors = take.div_ceil(SECTOR_SIZE);
        let window = &mut buf[..sectors * SECTOR_SIZE];
        window.fill(0);
        source.read_at(offset, &mut window[..take])?;
        store.write_sectors(lba + offset / SECTOR_SIZE as u64, window)?;
        offset += take as u64;
    }
    Ok(())
}
