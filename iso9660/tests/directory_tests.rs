//! Directory navigation and file finding tests

mod common;

use common::{dir_flags, encode, minimal_iso, record, sample_tree, SECTOR};
use iso9660::directory::iterator::DirectoryIterator;
use iso9660::directory::path_table::{PathTable, PathTableType};
use iso9660::directory::read_dir;
use iso9660::error::{Iso9660Error, Structure};
use iso9660::file::extent::Extent;
use iso9660::types::FileFlags;
use iso9660::{
    find_file, mount, read_image, DirectoryTree, MemoryStore, NamePolicy, ParseOptions,
};

/// Minimal volume whose root spans two blocks; `second` goes at the start of
/// block two.
fn two_block_root(second: &[u8]) -> MemoryStore {
    let mut data = minimal_iso();
    let pvd = 16 * SECTOR;
    let root = record(&[0], 20, 4096, dir_flags()).to_bytes();
    data[pvd + 156..pvd + 190].copy_from_slice(&root);
    let dir = 20 * SECTOR;
    data[dir..dir + 34].copy_from_slice(&root);
    data[dir + 34..dir + 68].copy_from_slice(&record(&[1], 20, 4096, dir_flags()).to_bytes());
    data[dir + SECTOR..dir + SECTOR + second.len()].copy_from_slice(second);
    MemoryStore::from_vec(data)
}

#[test]
fn test_root_paths() {
    let mut store = MemoryStore::from_vec(minimal_iso());
    let volume = mount(&mut store).expect("mount should succeed");

    // These should all return the root directory
    for path in ["", "/", "//"] {
        let entry = find_file(&mut store, &volume, path)
            .unwrap_or_else(|e| panic!("Path '{}' should resolve to root: {}", path, e));
        assert_eq!(entry.extent_lba(), Some(volume.root_extent_lba));
        assert!(entry.flags.directory);
    }
}

#[test]
fn test_find_nonexistent_file() {
    let mut store = MemoryStore::from_vec(minimal_iso());
    let volume = mount(&mut store).expect("mount should succeed");

    let result = find_file(&mut store, &volume, "/nonexistent.txt");
    assert_eq!(result.unwrap_err(), Iso9660Error::NotFound);
}

#[test]
fn test_path_depth_limit() {
    let mut store = MemoryStore::from_vec(minimal_iso());
    let volume = mount(&mut store).expect("mount should succeed");

    let deep_path = "/level".repeat(10);
    let result = find_file(&mut store, &volume, &deep_path);
    assert_eq!(result.unwrap_err(), Iso9660Error::PathTooLong);
}

#[test]
fn test_case_insensitive_lookup() {
    let mut store = encode(&sample_tree());
    let volume = mount(&mut store).expect("mount");

    let upper = find_file(&mut store, &volume, "/SUB/B.TXT").expect("exact case");
    let lower = find_file(&mut store, &volume, "/sub/b.txt").expect("lower case");
    assert_eq!(upper, lower);
    assert_eq!(upper.name, "B.TXT");
    assert_eq!(upper.size, 5);
}

#[test]
fn test_file_in_path_is_not_a_directory() {
    let mut store = encode(&sample_tree());
    let volume = mount(&mut store).expect("mount");
    assert_eq!(
        find_file(&mut store, &volume, "/A.TXT/B.TXT").unwrap_err(),
        Iso9660Error::NotADirectory
    );
}

#[test]
fn test_read_dir_skips_dot_entries() {
    let mut store = encode(&sample_tree());
    let volume = mount(&mut store).expect("mount");

    let root = Extent::new(volume.root_extent_lba, volume.root_extent_len);
    let entries = read_dir(&mut store, root).expect("read_dir");
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["A.TXT", "SUB"]);
    assert!(entries[0].is_file());
    assert!(entries[1].is_directory());
}

#[test]
fn test_zero_length_byte_skips_to_next_block() {
    let file = record(b"LATE.TXT;1", 22, 3, FileFlags::default()).to_bytes();
    let mut store = two_block_root(&file);
    let volume = mount(&mut store).expect("mount");

    let found = find_file(&mut store, &volume, "/LATE.TXT").expect("record in second block");
    assert_eq!(found.extents, vec![Extent::new(22, 3)]);

    let root = Extent::new(volume.root_extent_lba, volume.root_extent_len);
    let all: Vec<_> = DirectoryIterator::new(&mut store, root)
        .collect::<Result<_, _>>()
        .expect("iterate");
    assert_eq!(all.len(), 3);
}

#[test]
fn test_record_crossing_block_boundary() {
    let mut data = minimal_iso();
    // Seven 255-byte records after "." and "..", then one that runs past the block
    let mut at = 20 * SECTOR + 68;
    for _ in 0..8 {
        data[at] = 255;
        data[at + 32] = 1;
        data[at + 33] = b'F';
        at += 255;
    }
    let mut store = MemoryStore::from_vec(data);
    let volume = mount(&mut store).expect("mount");

    let root = Extent::new(volume.root_extent_lba, volume.root_extent_len);
    let result: Result<Vec<_>, _> = DirectoryIterator::new(&mut store, root).collect();
    assert_eq!(
        result.unwrap_err(),
        Iso9660Error::Format {
            structure: Structure::DirectoryRecord,
            offset: 20 * 2048 + 68 + 7 * 255,
            reason: "record crosses a block boundary",
        }
    );
}

#[test]
fn test_multi_extent_records_merge() {
    let first = FileFlags {
        not_final: true,
        ..FileFlags::default()
    };
    let mut second = record(b"BIG.DAT;1", 21, 2048, first).to_bytes();
    second.extend(record(b"BIG.DAT;1", 23, 100, FileFlags::default()).to_bytes());
    let mut store = two_block_root(&second);
    let volume = mount(&mut store).expect("mount");

    let file = find_file(&mut store, &volume, "/BIG.DAT").expect("find");
    assert_eq!(file.size, 2148);
    assert_eq!(file.extents, vec![Extent::new(21, 2048), Extent::new(23, 100)]);
    assert!(!file.flags.not_final);
}

#[test]
fn test_interrupted_multi_extent_chain() {
    let first = FileFlags {
        not_final: true,
        ..FileFlags::default()
    };
    let mut second = record(b"BIG.DAT;1", 21, 2048, first).to_bytes();
    second.extend(record(b"OTHER.DAT;1", 23, 100, FileFlags::default()).to_bytes());
    let mut store = two_block_root(&second);
    let volume = mount(&mut store).expect("mount");
    let root = Extent::new(volume.root_extent_lba, volume.root_extent_len);

    assert!(matches!(
        read_dir(&mut store, root),
        Err(Iso9660Error::Format {
            reason: "multi-extent file interrupted",
            ..
        })
    ));
}

#[test]
fn test_directory_cycle_detected() {
    // A subdirectory whose extent is the root itself
    let loop_record = record(b"LOOP", 20, 4096, dir_flags()).to_bytes();
    let mut store = two_block_root(&loop_record);
    let root = iso9660::volume::VolumeDescriptorSet::parse(&mut store)
        .expect("descriptors")
        .primary()
        .expect("primary")
        .root_directory_record
        .clone();

    assert!(matches!(
        DirectoryTree::parse(&mut store, &root, NamePolicy::Level2),
        Err(Iso9660Error::Format {
            structure: Structure::DirectoryRecord,
            reason: "directory extent referenced twice",
            ..
        })
    ));
}

#[test]
fn test_missing_dot_record() {
    let mut data = minimal_iso();
    let dir = 20 * SECTOR;
    // Turn "." into a file record
    data[dir + 33] = b'X';
    let mut store = MemoryStore::from_vec(data);
    let root = iso9660::volume::VolumeDescriptorSet::parse(&mut store)
        .expect("descriptors")
        .primary()
        .expect("primary")
        .root_directory_record
        .clone();

    assert!(matches!(
        DirectoryTree::parse(&mut store, &root, NamePolicy::Level2),
        Err(Iso9660Error::Format {
            reason: "first record is not '.' for this directory",
            ..
        })
    ));
}

#[test]
fn test_path_tables_agree() {
    let mut store = encode(&sample_tree());
    let volume = mount(&mut store).expect("mount");

    let l = PathTable::read(&mut store, &volume, PathTableType::LittleEndian).expect("L");
    let m = PathTable::read(&mut store, &volume, PathTableType::BigEndian).expect("M");
    assert_eq!(l, m);
    assert_eq!(l.entries().len(), 2);
    assert_eq!(l.path(2).expect("path"), "/SUB");
    assert_eq!(l.find("/SUB"), Some(2));
    assert!(l.is_canonically_ordered());

    let root_entry = &l.entries()[0];
    assert!(root_entry.is_root());
    assert_eq!(root_entry.parent, 1);
    assert_eq!(root_entry.extent_lba, volume.root_extent_lba);
}

#[test]
fn test_path_table_mismatch() {
    let mut store = encode(&sample_tree());
    let volume = mount(&mut store).expect("mount");

    // Point the type M copy of SUB somewhere else
    let mut data = store.into_vec();
    let m = volume.type_m_path_table as usize * SECTOR;
    data[m + 10 + 2..m + 10 + 6].copy_from_slice(&99u32.to_be_bytes());
    let mut store = MemoryStore::from_vec(data);

    assert!(matches!(
        PathTable::read_verified(&mut store, &volume, true),
        Err(Iso9660Error::Format {
            structure: Structure::PathTable,
            ..
        })
    ));
    assert!(PathTable::read_verified(&mut store, &volume, false).is_ok());
}

#[test]
fn test_path_table_disagrees_with_directories() {
    let mut store = encode(&sample_tree());
    let volume = mount(&mut store).expect("mount");

    // Both copies agree on a wrong extent for SUB
    let mut data = store.into_vec();
    let l = volume.type_l_path_table as usize * SECTOR;
    let m = volume.type_m_path_table as usize * SECTOR;
    data[l + 10 + 2..l + 10 + 6].copy_from_slice(&999u32.to_le_bytes());
    data[m + 10 + 2..m + 10 + 6].copy_from_slice(&999u32.to_be_bytes());
    let mut store = MemoryStore::from_vec(data);

    assert!(PathTable::read_verified(&mut store, &volume, true).is_ok());
    assert_eq!(
        read_image(&mut store, &ParseOptions::default()).err(),
        Some(Iso9660Error::Format {
            structure: Structure::PathTable,
            offset: l as u64 + 10,
            reason: "extent differs from the directory record",
        })
    );

    let relaxed = ParseOptions {
        verify_path_tables: false,
        ..ParseOptions::default()
    };
    assert!(read_image(&mut store, &relaxed).is_ok());
}

#[test]
fn test_empty_directory_has_two_records() {
    let mut tree = DirectoryTree::new();
    let root = tree.root();
    tree.create_dir(root, "EMPTY").expect("mkdir");
    let mut store = encode(&tree);
    let volume = mount(&mut store).expect("mount");

    let empty = find_file(&mut store, &volume, "/EMPTY").expect("find");
    assert_eq!(empty.size, 2048);
    let records: Vec<_> = DirectoryIterator::new(&mut store, empty.extents[0])
        .collect::<Result<_, _>>()
        .expect("iterate");
    assert_eq!(records.len(), 2);
    assert!(records[0].is_self());
    assert!(records[1].is_parent());
    assert_eq!(records[1].extent_lba, volume.root_extent_lba);
}
