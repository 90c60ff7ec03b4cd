//! Boot catalog validation entry
//!
//! The validation entry verifies catalog integrity via checksum: the sixteen
//! little-endian words of the entry sum to zero.

use crate::error::{Iso9660Error, Result, Structure};
use crate::types::{BootPlatform, SECTOR_SIZE};
use crate::utils::checksum;
use alloc::string::String;

/// Validation Entry (first 32 bytes of the catalog)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationEntry {
    /// Platform of the default entry
    pub platform: BootPlatform,

    /// Manufacturer/developer ID string (up to 24 bytes)
    pub id_string: String,
}

impl ValidationEntry {
    /// Header ID constant
    pub const HEADER_ID: u8 = 0x01;

    /// Key bytes constant
    pub const KEY_BYTES: [u8; 2] = [0x55, 0xAA];

    /// Entry for `platform` with an ID string
    pub fn new(platform: BootPlatform, id_string: &str) -> Self {
        Self {
            platform,
            id_string: String::from(id_string),
        }
    }

    /// Decode and verify the entry at the start of the catalog at `lba`
    pub fn parse(bytes: &[u8; 32], lba: u32) -> Result<Self> {
        let offset = lba as u64 * SECTOR_SIZE as u64;
        if bytes[0] != Self::HEADER_ID {
            return Err(Iso9660Error::format(
                Structure::BootCatalog,
                offset,
                "validation entry header is not 0x01",
            ));
        }
        if bytes[30..32] != Self::KEY_BYTES {
            return Err(Iso9660Error::format(
                Structure::BootCatalog,
                offset + 30,
                "validation entry key is not 55 AA",
            ));
        }
        let sum = checksum::checksum_16(bytes);
        if sum != 0 {
            return Err(Iso9660Error::Checksum { lba, sum });
        }

        let id = &bytes[4..28];
        let end = id.iter().position(|&b| b == 0).unwrap_or(id.len());
        Ok(Self {
            platform: BootPlatform::from_id(bytes[1]),
            id_string: String::from_utf8_lossy(&id[..end]).trim_end().into(),
        })
    }

    /// Encode with the checksum word filled in
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[0] = Self::HEADER_ID;
        out[1] = self.platform.id();
        let id = self.id_string.as_bytes();
        let len = id.len().min(24);
        out[4..4 + len].copy_from_slice(&id[..len]);
        out[30..32].copy_from_slice(&Self::KEY_BYTES);
        let complement = checksum::calculate_complement_16(&out);
        out[28..30].copy_from_slice(&complement.to_le_bytes());
        out
    }
}
