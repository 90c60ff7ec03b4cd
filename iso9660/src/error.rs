//! Error types for ISO9660 operations

use alloc::string::String;
use core::fmt;

/// Result type for ISO9660 operations
pub type Result<T> = core::result::Result<T, Iso9660Error>;

/// On-disk structure an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    /// Volume descriptor header or unknown descriptor
    VolumeDescriptor,
    /// Primary Volume Descriptor
    PrimaryVolumeDescriptor,
    /// El Torito boot record descriptor
    BootRecord,
    /// Type L or type M path table
    PathTable,
    /// Directory record
    DirectoryRecord,
    /// El Torito boot catalog
    BootCatalog,
    /// 17-byte or 7-byte timestamp
    Timestamp,
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::VolumeDescriptor => "volume descriptor",
            Self::PrimaryVolumeDescriptor => "primary volume descriptor",
            Self::BootRecord => "boot record descriptor",
            Self::PathTable => "path table",
            Self::DirectoryRecord => "directory record",
            Self::BootCatalog => "boot catalog",
            Self::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during ISO9660 operations
///
/// Offsets are absolute byte offsets within the volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Iso9660Error {
    /// Malformed on-disk structure
    Format {
        /// Structure being decoded
        structure: Structure,
        /// Absolute byte offset of the offending field or record
        offset: u64,
        /// What was wrong
        reason: &'static str,
    },

    /// Little- and big-endian halves of a both-endian field disagree
    EndiannessMismatch {
        /// Field name
        field: &'static str,
        /// Absolute byte offset of the field
        offset: u64,
        /// Little-endian value
        little: u32,
        /// Big-endian value
        big: u32,
    },

    /// Identifier violates the character set or length rules
    InvalidName {
        /// Rejected identifier
        name: String,
        /// Rule that was violated
        reason: &'static str,
    },

    /// Allocated extents exceed the available volume space
    VolumeOverflow {
        /// Blocks the layout needs
        required: u64,
        /// Blocks available
        available: u64,
    },

    /// El Torito validation entry does not sum to zero
    Checksum {
        /// LBA of the boot catalog
        lba: u32,
        /// Residual 16-bit word sum
        sum: u16,
    },

    /// Error reported by the sector store or the host filesystem
    Io {
        /// Sector being accessed, if any
        lba: Option<u64>,
        /// Message from the underlying device
        message: String,
    },

    /// File or directory not found
    NotFound,

    /// Path component or node is not a directory
    NotADirectory,

    /// Node is a directory where a file was expected
    NotAFile,

    /// Path is too deep
    PathTooLong,

    /// More directories than path table numbers (65535)
    TooManyDirectories(usize),

    /// Invalid path format
    InvalidPath,

    /// File extent out of bounds
    ExtentOutOfBounds,

    /// No boot record / boot catalog on the volume
    NoBootCatalog,

    /// Boot image attachment refers to something that cannot be booted
    InvalidBootImage(&'static str),

    /// File node has no byte source to encode from
    MissingSource,

    /// Buffer length is not a whole number of 2048-byte sectors
    UnalignedBuffer(usize),

    /// Device block size cannot carry 2048-byte sectors
    UnsupportedBlockSize(u32),
}

impl Iso9660Error {
    pub(crate) fn format(structure: Structure, offset: u64, reason: &'static str) -> Self {
        Self::Format {
            structure,
            offset,
            reason,
        }
    }

    pub(crate) fn invalid_name(name: &str, reason: &'static str) -> Self {
        Self::InvalidName {
            name: String::from(name),
            reason,
        }
    }
}

impl fmt::Display for Iso9660Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format {
                structure,
                offset,
                reason,
            } => write!(f, "Malformed {} at byte {}: {}", structure, offset, reason),
            Self::EndiannessMismatch {
                field,
                offset,
                little,
                big,
            } => write!(
                f,
                "Both-endian field {} at byte {} disagrees (LE {}, BE {})",
                field, offset, little, big
            ),
            Self::InvalidName { name, reason } => {
                write!(f, "Invalid identifier {:?}: {}", name, reason)
            }
            Self::VolumeOverflow {
                required,
                available,
            } => write!(
                f,
                "Volume needs {} blocks but only {} are available",
                required, available
            ),
            Self::Checksum { lba, sum } => write!(
                f,
                "Boot catalog at LBA {} fails validation checksum (sum {:#06x})",
                lba, sum
            ),
            Self::Io {
                lba: Some(lba),
                message,
            } => write!(f, "I/O error at sector {}: {}", lba, message),
            Self::Io { lba: None, message } => write!(f, "I/O error: {}", message),
            Self::NotFound => write!(f, "File or directory not found"),
            Self::NotADirectory => write!(f, "Not a directory"),
            Self::NotAFile => write!(f, "Not a file"),
            Self::PathTooLong => write!(f, "Path exceeds maximum depth"),
            Self::TooManyDirectories(count) => {
                write!(f, "{} directories do not fit the 16-bit path table numbering", count)
            }
            Self::InvalidPath => write!(f, "Invalid path format"),
            Self::ExtentOutOfBounds => write!(f, "File extent out of bounds"),
            Self::NoBootCatalog => write!(f, "No boot catalog found"),
            Self::InvalidBootImage(reason) => write!(f, "Invalid boot image: {}", reason),
            Self::MissingSource => write!(f, "File has no byte source to encode from"),
            Self::UnalignedBuffer(len) => {
                write!(f, "Buffer of {} bytes is not a whole number of sectors", len)
            }
            Self::UnsupportedBlockSize(size) => {
                write!(f, "Device block size {} cannot carry 2048-byte sectors", size)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Iso9660Error {}
