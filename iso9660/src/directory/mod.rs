//! Directory record parsing and navigation

pub mod flags;
#[cfg(feature = "std")]
pub mod import;
pub mod iterator;
pub mod path_table;
pub mod record;
pub mod tree;
pub mod writer;

use crate::error::{Iso9660Error, Result, Structure};
use crate::file::extent::Extent;
use crate::store::SectorStore;
use crate::types::{FileFlags, FileRecord, VolumeInfo, MAX_DIRECTORY_DEPTH, SECTOR_SIZE};
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// List a directory extent as file records
///
/// "." and ".." are skipped and multi-extent chains are merged.
pub fn read_dir<S: SectorStore + ?Sized>(store: &mut S, extent: Extent) -> Result<Vec<FileRecord>> {
    let mut entries: Vec<FileRecord> = Vec::new();
    let mut open_chain = false;

    for record in iterator::DirectoryIterator::new(store, extent) {
        let record = record?;
        if record.is_self() || record.is_parent() {
            continue;
        }

        let name = record.name();
        if open_chain {
            let last = entries
                .last_mut()
                .filter(|last| last.name == name)
                .ok_or(Iso9660Error::format(
                    Structure::DirectoryRecord,
                    extent.lba as u64 * SECTOR_SIZE as u64,
                    "multi-extent file interrupted",
                ))?;
            last.extents.push(record.extent());
            last.size += record.data_length as u64;
            last.flags = record.flags;
        } else {
            entries.push(FileRecord {
                name,
                size: record.data_length as u64,
                extents: vec![record.extent()],
                flags: record.flags,
                recorded: record.recorded,
                file_unit_size: record.file_unit_size,
                interleave_gap: record.interleave_gap,
            });
        }
        open_chain = record.flags.not_final;
    }

    Ok(entries)
}

/// Find a file or directory by path
///
/// Navigates the directory tree from root to locate a file/directory.
/// Paths are case-insensitive and `/` separated.
///
/// # Arguments
/// * `store` - Sector store holding the volume
/// * `volume` - Mounted volume info
/// * `path` - Path to find (e.g., "/BOOT/VMLINUZ", "/live/initrd.img")
///
/// # Returns
/// File record if found, with metadata and extent locations
///
/// # Example
/// ```ignore
/// use iso9660::{mount, find_file};
///
/// let volume = mount(&mut store)?;
/// let file = find_file(&mut store, &volume, "/BOOT/VMLINUZ")?;
/// println!("File size: {} bytes", file.size);
/// ```
pub fn find_file<S: SectorStore + ?Sized>(
    store: &mut S,
    volume: &VolumeInfo,
    path: &str,
) -> Result<FileRecord> {
    let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();

    if components.len() > MAX_DIRECTORY_DEPTH {
        return Err(Iso9660Error::PathTooLong);
    }

    let root = Extent::new(volume.root_extent_lba, volume.root_extent_len);
    let Some((last, parents)) = components.split_last() else {
        return Ok(FileRecord {
            name: String::from("/"),
            size: root.length as u64,
            extents: vec![root],
            flags: FileFlags {
                directory: true,
                ..FileFlags::default()
            },
            recorded: Default::default(),
            file_unit_size: 0,
            interleave_gap: 0,
        });
    };

    let mut current = root;
    for component in parents {
        let entry = read_dir(store, current)?
            .into_iter()
            .find(|e| e.name.eq_ignore_ascii_case(component))
            .ok_or(Iso9660Error::NotFound)?;
        if !entry.flags.directory {
            return Err(Iso9660Error::NotADirectory);
        }
        current = entry.extents.first().copied().ok_or(Iso9660Error::NotFound)?;
    }

    read_dir(store, current)?
        .into_iter()
        .find(|e| e.name.eq_ignore_ascii_case(last))
        .ok_or(Iso9660Error::NotFound)
}
