//! Common types and constants for ISO9660

use crate::file::extent::Extent;
use crate::utils::datetime::DateTime7;
use alloc::string::String;
use alloc::vec::Vec;

/// ISO9660 sector size (always 2048 bytes)
pub const SECTOR_SIZE: usize = 2048;

/// Volume descriptor set starts at sector 16
pub const VOLUME_DESCRIPTOR_START: u64 = 16;

/// Sectors 0-15 form the system area
pub const SYSTEM_AREA_SECTORS: u32 = 16;

/// Maximum path length
pub const MAX_PATH_LENGTH: usize = 255;

/// Maximum directory depth
pub const MAX_DIRECTORY_DEPTH: usize = 8;

/// Largest data length a single directory record may carry (whole sectors below 4 GiB)
pub const MAX_EXTENT_LENGTH: u64 = 0xFFFF_F800;

/// Volume descriptor type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VolumeDescriptorType {
    /// Boot Record (El Torito)
    BootRecord = 0,
    /// Primary Volume Descriptor
    Primary = 1,
    /// Supplementary Volume Descriptor (Joliet)
    Supplementary = 2,
    /// Volume Partition Descriptor
    Partition = 3,
    /// Volume Descriptor Set Terminator
    Terminator = 255,
}

impl VolumeDescriptorType {
    /// Map a type code to a known descriptor type
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::BootRecord),
            1 => Some(Self::Primary),
            2 => Some(Self::Supplementary),
            3 => Some(Self::Partition),
            255 => Some(Self::Terminator),
            _ => None,
        }
    }
}

/// Parsed volume information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    /// Volume identifier (trailing spaces removed)
    pub volume_id: String,

    /// System identifier (trailing spaces removed)
    pub system_id: String,

    /// Root directory extent location (LBA)
    pub root_extent_lba: u32,

    /// Root directory extent length (bytes)
    pub root_extent_len: u32,

    /// Logical block size (always 2048 once mounted)
    pub logical_block_size: u16,

    /// Volume space size (total sectors)
    pub volume_space_size: u32,

    /// Path table size in bytes
    pub path_table_size: u32,

    /// Type L path table location
    pub type_l_path_table: u32,

    /// Type M path table location
    pub type_m_path_table: u32,

    /// El Torito boot catalog LBA (if present)
    pub boot_catalog_lba: Option<u32>,
}

/// File record: decoded view of a directory record (or a chain of not-final records)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// File identifier with version suffix removed
    pub name: String,

    /// File size in bytes (sum of all extents)
    pub size: u64,

    /// Extents holding the data, in file order
    pub extents: Vec<Extent>,

    /// File flags of the final record
    pub flags: FileFlags,

    /// Recording date and time
    pub recorded: DateTime7,

    /// File unit size (interleaved files)
    pub file_unit_size: u8,

    /// Interleave gap size
    pub interleave_gap: u8,
}

/// File flags from directory record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileFlags {
    /// Hidden file
    pub hidden: bool,

    /// Directory (not a file)
    pub directory: bool,

    /// Associated file
    pub associated: bool,

    /// Extended attribute record format
    pub extended_format: bool,

    /// Owner/group permissions in extended attributes
    pub extended_permissions: bool,

    /// Not final directory record for this file
    pub not_final: bool,
}

/// Boot image information (El Torito)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootImage {
    /// Platform of the section (or validation entry) holding this entry
    pub platform: BootPlatform,

    /// Bootable flag
    pub bootable: bool,

    /// Boot media type
    pub media_type: BootMediaType,

    /// Load segment (x86, 0 = default 0x7C0)
    pub load_segment: u16,

    /// System type
    pub system_type: u8,

    /// Sector count (512-byte virtual sectors)
    pub sector_count: u16,

    /// Load RBA: LBA of the boot image
    pub load_rba: u32,
}

/// Boot media type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BootMediaType {
    /// No emulation
    NoEmulation = 0,
    /// 1.2MB floppy
    Floppy12M = 1,
    /// 1.44MB floppy
    Floppy144M = 2,
    /// 2.88MB floppy
    Floppy288M = 3,
    /// Hard disk
    HardDisk = 4,
}

impl BootMediaType {
    /// Decode the low nibble of the media type byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value & 0x0F {
            0 => Some(Self::NoEmulation),
            1 => Some(Self::Floppy12M),
            2 => Some(Self::Floppy144M),
            3 => Some(Self::Floppy288M),
            4 => Some(Self::HardDisk),
            _ => None,
        }
    }

    /// Is this one of the emulated media types
    pub fn is_emulated(self) -> bool {
        self != Self::NoEmulation
    }
}

/// Boot platform ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootPlatform {
    /// x86 PC
    X86,
    /// PowerPC
    PowerPC,
    /// Mac
    Mac,
    /// EFI
    Efi,
    /// Any other platform byte
    Other(u8),
}
