//! Volume descriptor parsing
//!
//! ISO9660 volume descriptors start at sector 16 and describe the filesystem layout.
//! Multiple descriptors may be present (Primary, Supplementary, Boot Record);
//! the set ends with a terminator.

pub mod boot_record;
pub mod primary;

use crate::error::{Iso9660Error, Result, Structure};
use crate::store::SectorStore;
use crate::types::{VolumeDescriptorType, VolumeInfo, SECTOR_SIZE, VOLUME_DESCRIPTOR_START};
use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use boot_record::BootRecordDescriptor;
use primary::{PrimaryVolumeDescriptor, STANDARD_ID};

/// Descriptors read before a terminator is required
pub const MAX_DESCRIPTORS: u64 = 100;

/// One volume descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeDescriptor {
    /// Boot record (type 0)
    BootRecord(BootRecordDescriptor),
    /// Primary volume descriptor (type 1)
    Primary(Box<PrimaryVolumeDescriptor>),
    /// Supplementary, partition or reserved descriptor kept as raw bytes
    Unrecognized {
        /// Type code
        type_code: u8,
        /// Full sector
        data: Vec<u8>,
    },
    /// Volume descriptor set terminator (type 255)
    Terminator,
}

impl VolumeDescriptor {
    /// Encode as one 2048-byte sector
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::BootRecord(record) => record.to_bytes(),
            Self::Primary(pvd) => pvd.to_bytes(),
            Self::Unrecognized { data, .. } => data.clone(),
            Self::Terminator => {
                let mut out = vec![0u8; SECTOR_SIZE];
                out[0] = VolumeDescriptorType::Terminator as u8;
                out[1..6].copy_from_slice(STANDARD_ID);
                out[6] = 1;
                out
            }
        }
    }
}

/// Descriptors from LBA 16 up to and including the terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeDescriptorSet {
    descriptors: Vec<VolumeDescriptor>,
}

impl VolumeDescriptorSet {
    /// Primary descriptor, optional boot record, terminator
    pub fn new(primary: PrimaryVolumeDescriptor, boot_record: Option<BootRecordDescriptor>) -> Self {
        let mut descriptors = vec![VolumeDescriptor::Primary(Box::new(primary))];
        descriptors.extend(boot_record.map(VolumeDescriptor::BootRecord));
        descriptors.push(VolumeDescriptor::Terminator);
        Self { descriptors }
    }

    /// Read descriptors starting at LBA 16 until the terminator
    pub fn parse<S: SectorStore + ?Sized>(store: &mut S) -> Result<Self> {
        let mut buffer = [0u8; SECTOR_SIZE];
        let mut descriptors = Vec::new();
        let mut has_primary = false;

        for lba in VOLUME_DESCRIPTOR_START..VOLUME_DESCRIPTOR_START + MAX_DESCRIPTORS {
            store.read_sectors(lba, &mut buffer)?;
            let base = lba * SECTOR_SIZE as u64;

            if &buffer[1..6] != STANDARD_ID {
                return Err(Iso9660Error::format(
                    Structure::VolumeDescriptor,
                    base + 1,
                    "standard identifier is not CD001",
                ));
            }
            if buffer[6] != 1 {
                return Err(Iso9660Error::format(
                    Structure::VolumeDescriptor,
                    base + 6,
                    "unsupported descriptor version",
                ));
            }

            let descriptor = match VolumeDescriptorType::from_u8(buffer[0]) {
                Some(VolumeDescriptorType::Terminator) => {
                    descriptors.push(VolumeDescriptor::Terminator);
                    if !has_primary {
                        return Err(Iso9660Error::format(
                            Structure::VolumeDescriptor,
                            base,
                            "no primary volume descriptor before terminator",
                        ));
                    }
                    log::debug!("volume descriptor set: {} descriptors", descriptors.len());
                    return Ok(Self { descriptors });
                }
                Some(VolumeDescriptorType::Primary) => {
                    if has_primary {
                        return Err(Iso9660Error::format(
                            Structure::PrimaryVolumeDescriptor,
                            base,
                            "duplicate primary volume descriptor",
                        ));
                    }
                    has_primary = true;
                    VolumeDescriptor::Primary(Box::new(PrimaryVolumeDescriptor::parse(&buffer, lba)?))
                }
                Some(VolumeDescriptorType::BootRecord) => {
                    let record = BootRecordDescriptor::parse(&buffer, lba)?;
                    log::debug!("boot record at LBA {}: {:?}", lba, record.boot_system_id);
                    VolumeDescriptor::BootRecord(record)
                }
                _ => VolumeDescriptor::Unrecognized {
                    type_code: buffer[0],
                    data: buffer.to_vec(),
                },
            };
            descriptors.push(descriptor);
        }

        Err(Iso9660Error::format(
            Structure::VolumeDescriptor,
            (VOLUME_DESCRIPTOR_START + MAX_DESCRIPTORS) * SECTOR_SIZE as u64,
            "no terminator within 100 descriptors",
        ))
    }

    /// All descriptors in on-disk order
    pub fn descriptors(&self) -> &[VolumeDescriptor] {
        &self.descriptors
    }

    /// The primary descriptor
    pub fn primary(&self) -> Result<&PrimaryVolumeDescriptor> {
        self.descriptors
            .iter()
            .find_map(|d| match d {
                VolumeDescriptor::Primary(pvd) => Some(pvd.as_ref()),
                _ => None,
            })
            .ok_or(Iso9660Error::format(
                Structure::VolumeDescriptor,
                VOLUME_DESCRIPTOR_START * SECTOR_SIZE as u64,
                "missing primary volume descriptor",
            ))
    }

    /// The first El Torito boot record
    pub fn el_torito(&self) -> Option<&BootRecordDescriptor> {
        self.descriptors.iter().find_map(|d| match d {
            VolumeDescriptor::BootRecord(record) if record.is_el_torito() => Some(record),
            _ => None,
        })
    }

    /// Number of sectors the set occupies
    pub fn sector_count(&self) -> u32 {
        self.descriptors.len() as u32
    }

    /// Write the set starting at LBA 16
    pub fn write<S: SectorStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        let mut data = Vec::with_capacity(self.descriptors.len() * SECTOR_SIZE);
        for descriptor in &self.descriptors {
            data.extend_from_slice(&descriptor.to_bytes());
        }
        store.write_sectors(VOLUME_DESCRIPTOR_START, &data)
    }

    /// Summary of the volume
    pub fn info(&self) -> Result<VolumeInfo> {
        let pvd = self.primary()?;
        Ok(VolumeInfo {
            volume_id: pvd.volume_id.clone(),
            system_id: pvd.system_id.clone(),
            root_extent_lba: pvd.root_directory_record.extent_lba,
            root_extent_len: pvd.root_directory_record.data_length,
            logical_block_size: pvd.logical_block_size,
            volume_space_size: pvd.volume_space_size,
            path_table_size: pvd.path_table_size,
            type_l_path_table: pvd.type_l_path_table,
            type_m_path_table: pvd.type_m_path_table,
            boot_catalog_lba: self.el_torito().map(|r| r.catalog_lba),
        })
    }
}

/// Mount an ISO9660 volume
///
/// Reads volume descriptors starting at sector 16 and builds VolumeInfo.
///
/// # Arguments
/// * `store` - Sector store holding the ISO (see [`BlockIoStore`](crate::store::BlockIoStore)
///   for images embedded in a larger device)
///
/// # Returns
/// Parsed volume information
pub fn mount<S: SectorStore + ?Sized>(store: &mut S) -> Result<VolumeInfo> {
    VolumeDescriptorSet::parse(store)?.info()
}
