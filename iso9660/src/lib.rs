//! ISO9660 image codec
//!
//! A `no_std` reader and writer for ISO9660 (ECMA-119) volumes with El Torito
//! boot support.
//!
//! # Overview
//!
//! - Volume descriptor set (primary, boot record, terminator)
//! - Directory records, both path tables, the directory hierarchy
//! - File data in one or more extents
//! - El Torito boot catalogs, boot images, boot info tables
//! - A layout planner that assigns every structure its blocks before anything
//!   is written
//!
//! # Architecture
//!
//! The implementation is layered:
//! 1. **Store layer** - [`SectorStore`] over a `BlockIo` device or memory
//! 2. **Volume layer** - Volume descriptors from sector 16
//! 3. **Directory layer** - Directory records, path tables, the in-memory tree
//! 4. **File layer** - Reads file data from extents
//! 5. **Boot layer** - El Torito boot catalog
//! 6. **Build layer** - Extent allocation and image encoding
//!
//! # Usage
//!
//! ```ignore
//! use iso9660::{build_image, read_image, BuildOptions, DirectoryTree, MemoryStore, ParseOptions};
//!
//! let mut tree = DirectoryTree::new();
//! let root = tree.root();
//! tree.create_file(root, "README.TXT", b"hello".to_vec())?;
//! let bytes = build_image(&tree, &BuildOptions::default())?;
//!
//! let mut store = MemoryStore::from_vec(bytes);
//! let image = read_image(&mut store, &ParseOptions::default())?;
//! let file = image.tree.find("/README.TXT").unwrap();
//! let data = image.tree.read_file(&mut store, file)?;
//! ```
//!
//! # Mounting a device
//!
//! ```ignore
//! use iso9660::{find_boot_image, find_file, mount, read_file_vec, BlockIoStore};
//!
//! let mut store = BlockIoStore::new(block_io, start_block)?;
//! let volume = mount(&mut store)?;
//! let file = find_file(&mut store, &volume, "/isolinux/vmlinuz")?;
//! let kernel = read_file_vec(&mut store, &file)?;
//! let boot = find_boot_image(&mut store, &volume)?;
//! ```

#![no_std]
#![warn(missing_docs)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod boot;
pub mod build;
pub mod directory;
pub mod error;
pub mod file;
pub mod image;
pub mod store;
pub mod types;
pub mod utils;
pub mod volume;

pub use error::{Iso9660Error, Result};
pub use types::{BootImage, BootMediaType, BootPlatform, FileRecord, VolumeInfo};

pub use boot::{find_boot_image, read_boot_catalog, BootImageSpec};
pub use build::layout::{ExtentAllocator, Layout};
pub use build::options::{BuildOptions, ParseOptions};
pub use build::{build_image, write_image};
pub use directory::tree::{DirectoryTree, NodeId};
pub use directory::find_file;
pub use file::reader::FileReader;
pub use file::source::ByteSource;
#[cfg(feature = "std")]
pub use file::source::HostFile;
pub use file::{read_file, read_file_vec};
pub use image::{read_image, IsoImage};
pub use store::{BlockIoStore, MemoryStore, SectorStore};
pub use utils::string::NamePolicy;
pub use volume::mount;
#[cfg(feature = "std")]
pub use directory::import::{import_dir, tree_from_dir};
