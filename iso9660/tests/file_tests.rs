//! File reading tests

mod common;

use common::encode;
use iso9660::error::Iso9660Error;
use iso9660::{find_file, mount, read_file, read_file_vec, DirectoryTree, FileReader, MemoryStore};

fn single_file(name: &str, content: Vec<u8>) -> MemoryStore {
    let mut tree = DirectoryTree::new();
    let root = tree.root();
    tree.create_file(root, name, content).expect("create file");
    encode(&tree)
}

#[test]
fn test_read_file_content() {
    let mut store = single_file("TEST.TXT", b"Hello ISO9660".to_vec());

    let volume = mount(&mut store).expect("mount");
    let file = find_file(&mut store, &volume, "/TEST.TXT").expect("find");

    let mut content = vec![0u8; file.size as usize];
    assert_eq!(read_file(&mut store, &file, &mut content).expect("read"), 13);
    assert_eq!(content, b"Hello ISO9660");
}

#[test]
fn test_read_file_crossing_sectors() {
    // 2.5 sectors
    let expected: Vec<u8> = (0..5120).map(|i| (i % 256) as u8).collect();
    let mut store = single_file("LARGE.DAT", expected.clone());

    let volume = mount(&mut store).expect("mount");
    let file = find_file(&mut store, &volume, "/LARGE.DAT").expect("find");
    assert_eq!(file.size, 5120);
    assert_eq!(file.extents.len(), 1);

    assert_eq!(read_file_vec(&mut store, &file).expect("read"), expected);
}

#[test]
fn test_read_partial_last_sector() {
    // 1 sector + 2 bytes
    let expected = vec![0xAA; 2050];
    let mut store = single_file("PARTIAL.DAT", expected.clone());

    let volume = mount(&mut store).expect("mount");
    let file = find_file(&mut store, &volume, "/PARTIAL.DAT").expect("find");
    assert_eq!(read_file_vec(&mut store, &file).expect("read partial"), expected);

    // Padding after the data is zero
    let lba = file.extents[0].lba as usize;
    let bytes = store.as_bytes();
    assert_eq!(bytes[lba * 2048 + 2050], 0);
    assert!(bytes[lba * 2048 + 2050..(lba + 2) * 2048].iter().all(|&b| b == 0));
}

#[test]
fn test_buffer_too_small() {
    let mut store = single_file("TEST.TXT", b"Hello ISO9660".to_vec());
    let volume = mount(&mut store).expect("mount");
    let file = find_file(&mut store, &volume, "/TEST.TXT").expect("find");

    let mut content = [0u8; 4];
    assert_eq!(
        read_file(&mut store, &file, &mut content),
        Err(Iso9660Error::ExtentOutOfBounds)
    );
}

#[test]
fn test_empty_file() {
    let mut store = single_file("EMPTY.TXT", Vec::new());
    let volume = mount(&mut store).expect("mount");
    let file = find_file(&mut store, &volume, "/EMPTY.TXT").expect("find");
    assert_eq!(file.size, 0);
    // No blocks, so no position inside the volume
    assert_eq!(file.extent_lba(), Some(0));
    assert_eq!(volume.volume_space_size, 21);
    assert!(read_file_vec(&mut store, &file).expect("read").is_empty());
}

#[test]
fn test_file_reader_seek_and_read() {
    let expected: Vec<u8> = (0..6000u32).map(|i| (i * 7 % 251) as u8).collect();
    let mut store = single_file("STREAM.BIN", expected.clone());
    let volume = mount(&mut store).expect("mount");
    let file = find_file(&mut store, &volume, "/STREAM.BIN").expect("find");

    let mut reader = FileReader::new(&mut store, file);
    assert_eq!(reader.size(), 6000);

    let mut buf = [0u8; 100];
    reader.seek(2000);
    assert_eq!(reader.read(&mut buf).expect("read"), 100);
    assert_eq!(&buf[..], &expected[2000..2100]);
    assert_eq!(reader.position(), 2100);

    reader.seek_relative(-1100);
    assert_eq!(reader.position(), 1000);
    reader.seek_relative(4950);
    assert_eq!(reader.remaining(), 50);
    assert_eq!(reader.read(&mut buf).expect("read tail"), 50);
    assert_eq!(&buf[..50], &expected[5950..]);
    assert!(reader.is_eof());

    reader.seek(u64::MAX);
    assert_eq!(reader.position(), 6000);
}

#[cfg(feature = "std")]
#[test]
fn test_file_reader_io_read() {
    use std::io::Read;

    let mut store = single_file("TEST.TXT", b"Hello ISO9660".to_vec());
    let volume = mount(&mut store).expect("mount");
    let file = find_file(&mut store, &volume, "/TEST.TXT").expect("find");

    let mut text = String::new();
    FileReader::new(&mut store, file)
        .read_to_string(&mut text)
        .expect("read_to_string");
    assert_eq!(text, "Hello ISO9660");
}
