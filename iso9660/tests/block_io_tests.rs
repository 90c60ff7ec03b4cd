//! Block I/O implementation tests

mod common;

use common::{minimal_iso, sample_tree, MemoryBlockDevice, SECTOR};
use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;
use iso9660::error::Iso9660Error;
use iso9660::{
    find_file, mount, read_file_vec, write_image, BlockIoStore, BuildOptions, SectorStore,
};

#[test]
fn test_memory_block_device_creation() {
    let mut device = MemoryBlockDevice::new(vec![0u8; 10 * 2048]);
    assert_eq!(device.block_size().to_u32(), 2048);
    assert_eq!(device.num_blocks().unwrap(), 10);
}

#[test]
fn test_read_out_of_bounds() {
    let mut device = MemoryBlockDevice::new(vec![0u8; 10 * 2048]);
    let mut buffer = [0u8; 2048];
    assert!(device.read_blocks(Lba(10), &mut buffer).is_err());
}

#[test]
fn test_store_reads_sectors() {
    let mut data = vec![0u8; 10 * SECTOR];
    for block in 2..5 {
        data[block * SECTOR..(block + 1) * SECTOR].fill(block as u8);
    }
    let mut store = BlockIoStore::new(MemoryBlockDevice::new(data), 0).expect("store");

    assert_eq!(store.sector_count().unwrap(), 10);
    let sectors = store.read(2, 3).expect("read");
    for block in 0..3 {
        assert!(sectors[block * SECTOR..(block + 1) * SECTOR]
            .iter()
            .all(|&b| b == (block + 2) as u8));
    }
}

#[test]
fn test_store_over_512_byte_blocks() {
    let device = MemoryBlockDevice::with_block_size(minimal_iso(), 512);
    let mut store = BlockIoStore::new(device, 0).expect("512 divides 2048");
    assert_eq!(store.sector_count().unwrap(), 24);

    let volume = mount(&mut store).expect("mount");
    assert_eq!(volume.root_extent_lba, 20);
}

#[test]
fn test_store_with_start_offset() {
    // Image embedded 8 device blocks (4 KiB) into the device
    let mut data = vec![0xFFu8; 8 * 512];
    data.extend(minimal_iso());
    let device = MemoryBlockDevice::with_block_size(data, 512);
    let mut store = BlockIoStore::new(device, 8).expect("store");

    assert_eq!(store.sector_count().unwrap(), 24);
    let volume = mount(&mut store).expect("mount at offset");
    assert_eq!(volume.volume_id, "TEST_VOLUME");
}

#[test]
fn test_unsupported_block_size() {
    let device = MemoryBlockDevice::with_block_size(vec![0u8; 4 * 4096], 4096);
    assert!(matches!(
        BlockIoStore::new(device, 0),
        Err(Iso9660Error::UnsupportedBlockSize(4096))
    ));
}

#[test]
fn test_unaligned_buffer_rejected() {
    let mut store = BlockIoStore::new(MemoryBlockDevice::new(vec![0u8; 4 * SECTOR]), 0).unwrap();
    let mut buffer = vec![0u8; 512];
    assert_eq!(
        store.read_sectors(0, &mut buffer),
        Err(Iso9660Error::UnalignedBuffer(512))
    );
}

#[test]
fn test_device_error_carries_lba() {
    let mut store = BlockIoStore::new(MemoryBlockDevice::new(vec![0u8; 4 * SECTOR]), 0).unwrap();
    let mut buffer = [0u8; SECTOR];
    assert!(matches!(
        store.read_sectors(4, &mut buffer),
        Err(Iso9660Error::Io { lba: Some(4), .. })
    ));
}

#[test]
fn test_write_image_to_device() {
    let tree = sample_tree();
    let device = MemoryBlockDevice::with_block_size(vec![0u8; 32 * SECTOR], 512);
    let mut store = BlockIoStore::new(device, 0).expect("store");

    let layout = write_image(&mut store, &tree, &BuildOptions::default()).expect("write");
    assert_eq!(layout.total_blocks(), 24);

    let volume = mount(&mut store).expect("mount");
    let file = find_file(&mut store, &volume, "/A.TXT").expect("find");
    assert_eq!(read_file_vec(&mut store, &file).expect("read"), b"hello world");
}

#[test]
fn test_device_too_small_for_image() {
    let tree = sample_tree();
    let device = MemoryBlockDevice::new(vec![0u8; 20 * SECTOR]);
    let mut store = BlockIoStore::new(device, 0).expect("store");

    assert_eq!(
        write_image(&mut store, &tree, &BuildOptions::default()),
        Err(Iso9660Error::VolumeOverflow {
            required: 24,
            available: 20,
        })
    );
    // Nothing was written
    assert!(store.into_inner().data.iter().all(|&b| b == 0));
}
