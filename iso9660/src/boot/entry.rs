//! Boot catalog entry types
//!
//! Initial/Default, Section Header, and Section entries.

use crate::error::{Iso9660Error, Result, Structure};
use crate::types::{BootImage, BootMediaType, BootPlatform};
use alloc::string::String;

/// Initial/Default or Section Entry (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootEntry {
    /// Boot indicator is 0x88
    pub bootable: bool,

    /// Boot media type
    pub media_type: BootMediaType,

    /// Load segment (0 = default 0x7C0)
    pub load_segment: u16,

    /// System type (partition type from MBR)
    pub system_type: u8,

    /// Sector count (virtual sectors, 512 bytes each)
    pub sector_count: u16,

    /// Load RBA (ISO sector, 2048 bytes)
    pub load_rba: u32,
}

impl BootEntry {
    /// Bootable indicator
    pub const BOOTABLE: u8 = 0x88;

    /// Not bootable indicator
    pub const NOT_BOOTABLE: u8 = 0x00;

    /// Decode an entry; `offset` is its absolute position
    pub fn parse(bytes: &[u8; 32], offset: u64) -> Result<Self> {
        let bootable = match bytes[0] {
            Self::BOOTABLE => true,
            Self::NOT_BOOTABLE => false,
            _ => {
                return Err(Iso9660Error::format(
                    Structure::BootCatalog,
                    offset,
                    "boot indicator is neither 0x88 nor 0x00",
                ))
            }
        };
        let media_type = BootMediaType::from_u8(bytes[1]).ok_or(Iso9660Error::format(
            Structure::BootCatalog,
            offset + 1,
            "unknown boot media type",
        ))?;

        Ok(Self {
            bootable,
            media_type,
            load_segment: u16::from_le_bytes([bytes[2], bytes[3]]),
            system_type: bytes[4],
            sector_count: u16::from_le_bytes([bytes[6], bytes[7]]),
            load_rba: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
        })
    }

    /// Encode as 32 bytes
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[0] = if self.bootable {
            Self::BOOTABLE
        } else {
            Self::NOT_BOOTABLE
        };
        out[1] = self.media_type as u8;
        out[2..4].copy_from_slice(&self.load_segment.to_le_bytes());
        out[4] = self.system_type;
        out[6..8].copy_from_slice(&self.sector_count.to_le_bytes());
        out[8..12].copy_from_slice(&self.load_rba.to_le_bytes());
        out
    }

    /// Get image size in bytes (sector_count * 512)
    pub fn image_size(&self) -> u32 {
        self.sector_count as u32 * 512
    }

    /// Public view of this entry under `platform`
    pub fn to_boot_image(&self, platform: BootPlatform) -> BootImage {
        BootImage {
            platform,
            bootable: self.bootable,
            media_type: self.media_type,
            load_segment: self.load_segment,
            system_type: self.system_type,
            sector_count: self.sector_count,
            load_rba: self.load_rba,
        }
    }
}

/// Section Header Entry (32 bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    /// No further section headers follow
    pub last: bool,

    /// Platform of the section's entries
    pub platform: BootPlatform,

    /// Number of section entries following this header
    pub entry_count: u16,

    /// ID string (up to 28 bytes)
    pub id_string: String,
}

impl SectionHeader {
    /// More headers follow
    pub const MORE: u8 = 0x90;

    /// Final header
    pub const FINAL: u8 = 0x91;

    /// Section entry extension indicator
    pub const EXTENSION: u8 = 0x44;

    /// Is `indicator` a section header byte
    pub fn is_header(indicator: u8) -> bool {
        indicator == Self::MORE || indicator == Self::FINAL
    }

    /// Decode a header whose first byte is 0x90 or 0x91
    pub fn parse(bytes: &[u8; 32]) -> Self {
        let id = &bytes[4..32];
        let end = id.iter().position(|&b| b == 0).unwrap_or(id.len());
        Self {
            last: bytes[0] == Self::FINAL,
            platform: BootPlatform::from_id(bytes[1]),
            entry_count: u16::from_le_bytes([bytes[2], bytes[3]]),
            id_string: String::from_utf8_lossy(&id[..end]).trim_end().into(),
        }
    }

    /// Encode as 32 bytes
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[0] = if self.last { Self::FINAL } else { Self::MORE };
        out[1] = self.platform.id();
        out[2..4].copy_from_slice(&self.entry_count.to_le_bytes());
        let id = self.id_string.as_bytes();
        let len = id.len().min(28);
        out[4..4 + len].copy_from_slice(&id[..len]);
        out
    }
}
