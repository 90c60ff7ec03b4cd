//! Common test utilities and mock block devices

#![allow(dead_code)]

use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};
use iso9660::directory::record::DirectoryRecord;
use iso9660::file::extent::Extent;
use iso9660::types::FileFlags;
use iso9660::utils::datetime::DateTime7;
use iso9660::{BuildOptions, DirectoryTree, MemoryStore};
use std::io;

pub const SECTOR: usize = 2048;

/// In-memory block device for testing
#[derive(Debug, Clone)]
pub struct MemoryBlockDevice {
    pub data: Vec<u8>,
    pub block_size: usize,
}

impl MemoryBlockDevice {
    /// Create a new memory block device from raw data
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_block_size(data, SECTOR)
    }

    /// Device with a smaller native block (512 for hard-disk style media)
    pub fn with_block_size(data: Vec<u8>, block_size: usize) -> Self {
        Self { data, block_size }
    }

    /// Create from a file path
    pub fn from_file(path: &str) -> io::Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::new(data))
    }

    /// Create a minimal valid ISO9660 volume for testing
    ///
    /// 16: PVD, 17: terminator, 18: type L path table, 19: type M path table,
    /// 20: root directory. 24 sectors in total.
    pub fn create_minimal_iso() -> Self {
        Self::new(minimal_iso())
    }
}

impl BlockIo for MemoryBlockDevice {
    type Error = io::Error;

    fn block_size(&self) -> BlockSize {
        BlockSize::new(self.block_size as u32).expect("valid block size")
    }

    fn num_blocks(&mut self) -> Result<u64, Self::Error> {
        Ok((self.data.len() / self.block_size) as u64)
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
        let offset = start_lba.0 as usize * self.block_size;
        if offset + dst.len() > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "read beyond end of device",
            ));
        }
        dst.copy_from_slice(&self.data[offset..offset + dst.len()]);
        Ok(())
    }

    fn write_blocks(&mut self, start_lba: Lba, src: &[u8]) -> Result<(), Self::Error> {
        let offset = start_lba.0 as usize * self.block_size;
        if offset + src.len() > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "write beyond end of device",
            ));
        }
        self.data[offset..offset + src.len()].copy_from_slice(src);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub fn write_both_endian_u32(dst: &mut [u8], value: u32) {
    dst[0..4].copy_from_slice(&value.to_le_bytes());
    dst[4..8].copy_from_slice(&value.to_be_bytes());
}

pub fn write_both_endian_u16(dst: &mut [u8], value: u16) {
    dst[0..2].copy_from_slice(&value.to_le_bytes());
    dst[2..4].copy_from_slice(&value.to_be_bytes());
}

/// Directory record with zeroed timestamp
pub fn record(identifier: &[u8], lba: u32, length: u32, flags: FileFlags) -> DirectoryRecord {
    DirectoryRecord::new(
        identifier.to_vec(),
        Extent::new(lba, length),
        flags,
        DateTime7::default(),
    )
}

pub fn dir_flags() -> FileFlags {
    FileFlags {
        directory: true,
        ..FileFlags::default()
    }
}

/// Hand-assembled volume with an empty root
pub fn minimal_iso() -> Vec<u8> {
    let mut data = vec![0u8; 24 * SECTOR];

    // Primary Volume Descriptor (sector 16)
    let pvd = 16 * SECTOR;
    data[pvd] = 1;
    data[pvd + 1..pvd + 6].copy_from_slice(b"CD001");
    data[pvd + 6] = 1;
    data[pvd + 8..pvd + 40].fill(b' ');
    data[pvd + 8..pvd + 19].copy_from_slice(b"TEST SYSTEM");
    data[pvd + 40..pvd + 72].fill(b' ');
    data[pvd + 40..pvd + 51].copy_from_slice(b"TEST_VOLUME");
    write_both_endian_u32(&mut data[pvd + 80..], 24);
    write_both_endian_u16(&mut data[pvd + 120..], 1);
    write_both_endian_u16(&mut data[pvd + 124..], 1);
    write_both_endian_u16(&mut data[pvd + 128..], 2048);
    write_both_endian_u32(&mut data[pvd + 132..], 10);
    data[pvd + 140..pvd + 144].copy_from_slice(&18u32.to_le_bytes());
    data[pvd + 148..pvd + 152].copy_from_slice(&19u32.to_be_bytes());
    let root = record(&[0], 20, 2048, dir_flags()).to_bytes();
    data[pvd + 156..pvd + 156 + root.len()].copy_from_slice(&root);
    data[pvd + 881] = 1;

    // Terminator (sector 17)
    let term = 17 * SECTOR;
    data[term] = 255;
    data[term + 1..term + 6].copy_from_slice(b"CD001");
    data[term + 6] = 1;

    // Path tables: one entry for the root
    let l = 18 * SECTOR;
    data[l] = 1;
    data[l + 2..l + 6].copy_from_slice(&20u32.to_le_bytes());
    data[l + 6..l + 8].copy_from_slice(&1u16.to_le_bytes());
    let m = 19 * SECTOR;
    data[m] = 1;
    data[m + 2..m + 6].copy_from_slice(&20u32.to_be_bytes());
    data[m + 6..m + 8].copy_from_slice(&1u16.to_be_bytes());

    // Root directory (sector 20)
    let dir = 20 * SECTOR;
    let dot = record(&[0], 20, 2048, dir_flags()).to_bytes();
    let dotdot = record(&[1], 20, 2048, dir_flags()).to_bytes();
    data[dir..dir + 34].copy_from_slice(&dot);
    data[dir + 34..dir + 68].copy_from_slice(&dotdot);

    data
}

/// "/A.TXT" (11 bytes) and "/SUB/B.TXT" (5 bytes)
pub fn sample_tree() -> DirectoryTree {
    let mut tree = DirectoryTree::new();
    let root = tree.root();
    tree.create_file(root, "A.TXT", b"hello world".to_vec())
        .expect("create A.TXT");
    let sub = tree.create_dir(root, "SUB").expect("create SUB");
    tree.create_file(sub, "B.TXT", b"hello".to_vec())
        .expect("create B.TXT");
    tree
}

/// Encode `tree` with default options into a store ready for reading
pub fn encode(tree: &DirectoryTree) -> MemoryStore {
    let bytes = iso9660::build_image(tree, &BuildOptions::default()).expect("build image");
    MemoryStore::from_vec(bytes)
}
