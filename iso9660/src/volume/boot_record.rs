//! Boot Record Volume Descriptor (type 0)
//!
//! El Torito uses it to point at the boot catalog.

use crate::error::{Iso9660Error, Result, Structure};
use crate::types::{VolumeDescriptorType, SECTOR_SIZE};
use crate::volume::primary::STANDARD_ID;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// El Torito boot system identifier
pub const EL_TORITO_MAGIC: &[u8] = b"EL TORITO SPECIFICATION";

/// Decoded boot record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootRecordDescriptor {
    /// Boot system identifier (NULs removed)
    pub boot_system_id: String,

    /// Boot catalog LBA (El Torito records only)
    pub catalog_lba: u32,
}

impl BootRecordDescriptor {
    /// El Torito record pointing at `catalog_lba`
    pub fn el_torito(catalog_lba: u32) -> Self {
        Self {
            boot_system_id: String::from_utf8_lossy(EL_TORITO_MAGIC).into_owned(),
            catalog_lba,
        }
    }

    /// Parse a descriptor read from `lba`
    pub fn parse(data: &[u8], lba: u64) -> Result<Self> {
        if data.len() < SECTOR_SIZE || data[0] != VolumeDescriptorType::BootRecord as u8 {
            return Err(Iso9660Error::format(
                Structure::BootRecord,
                lba * SECTOR_SIZE as u64,
                "not a boot record descriptor",
            ));
        }
        let id = &data[7..39];
        let end = id.iter().position(|&b| b == 0).unwrap_or(id.len());
        Ok(Self {
            boot_system_id: String::from_utf8_lossy(&id[..end]).trim_end().into(),
            catalog_lba: u32::from_le_bytes([data[71], data[72], data[73], data[74]]),
        })
    }

    /// Does this record belong to El Torito
    pub fn is_el_torito(&self) -> bool {
        self.boot_system_id.as_bytes() == EL_TORITO_MAGIC
    }

    /// Encode as one 2048-byte sector
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; SECTOR_SIZE];
        out[0] = VolumeDescriptorType::BootRecord as u8;
        out[1..6].copy_from_slice(STANDARD_ID);
        out[6] = 1;
        let id = self.boot_system_id.as_bytes();
        let len = id.len().min(32);
        out[7..7 + len].copy_from_slice(&id[..len]);
        out[71..75].copy_from_slice(&self.catalog_lba.to_le_bytes());
        out
    }
}
