//! Primary Volume Descriptor parsing
//!
//! The Primary Volume Descriptor (PVD) is always present and describes
//! the basic ISO9660 filesystem structure. See ECMA-119 8.4.

use crate::directory::record::DirectoryRecord;
use crate::error::{Iso9660Error, Result, Structure};
use crate::types::{VolumeDescriptorType, SECTOR_SIZE};
use crate::utils::datetime::DateTime17;
use crate::utils::endian;
use crate::utils::string::{achars_to_str, pad_field};
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// Standard identifier of every descriptor
pub const STANDARD_ID: &[u8; 5] = b"CD001";

/// Primary Volume Descriptor (type 1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryVolumeDescriptor {
    /// System identifier (32 a-characters)
    pub system_id: String,

    /// Volume identifier (32 d-characters)
    pub volume_id: String,

    /// Volume space size in logical blocks
    pub volume_space_size: u32,

    /// Volume set size
    pub volume_set_size: u16,

    /// Volume sequence number
    pub volume_sequence_number: u16,

    /// Logical block size (always 2048)
    pub logical_block_size: u16,

    /// Path table size in bytes
    pub path_table_size: u32,

    /// Type L path table location
    pub type_l_path_table: u32,

    /// Optional type L path table location (0 = none)
    pub optional_type_l_path_table: u32,

    /// Type M path table location
    pub type_m_path_table: u32,

    /// Optional type M path table location (0 = none)
    pub optional_type_m_path_table: u32,

    /// Root directory record
    pub root_directory_record: DirectoryRecord,

    /// Volume set identifier (128 d-characters)
    pub volume_set_id: String,

    /// Publisher identifier (128 a-characters)
    pub publisher_id: String,

    /// Data preparer identifier (128 a-characters)
    pub preparer_id: String,

    /// Application identifier (128 a-characters)
    pub application_id: String,

    /// Copyright file identifier (37 characters)
    pub copyright_file_id: String,

    /// Abstract file identifier (37 characters)
    pub abstract_file_id: String,

    /// Bibliographic file identifier (37 characters)
    pub bibliographic_file_id: String,

    /// Volume creation date and time
    pub creation: DateTime17,

    /// Volume modification date and time
    pub modification: DateTime17,

    /// Volume expiration date and time
    pub expiration: DateTime17,

    /// Volume effective date and time
    pub effective: DateTime17,
}

// Field offsets within the descriptor
const SYSTEM_ID: core::ops::Range<usize> = 8..40;
const VOLUME_ID: core::ops::Range<usize> = 40..72;
const VOLUME_SET_ID: core::ops::Range<usize> = 190..318;
const PUBLISHER_ID: core::ops::Range<usize> = 318..446;
const PREPARER_ID: core::ops::Range<usize> = 446..574;
const APPLICATION_ID: core::ops::Range<usize> = 574..702;
const COPYRIGHT_ID: core::ops::Range<usize> = 702..739;
const ABSTRACT_ID: core::ops::Range<usize> = 739..776;
const BIBLIOGRAPHIC_ID: core::ops::Range<usize> = 776..813;
const ROOT_RECORD: usize = 156;
const TIMESTAMPS: [usize; 4] = [813, 830, 847, 864];
const FILE_STRUCTURE_VERSION: usize = 881;

fn text(data: &[u8], range: core::ops::Range<usize>) -> String {
    match achars_to_str(&data[range.clone()]) {
        Ok(s) => String::from(s),
        Err(_) => String::from_utf8_lossy(&data[range]).trim_end().into(),
    }
}

fn timestamp(data: &[u8], at: usize, base: u64) -> Result<DateTime17> {
    let mut raw = [0u8; 17];
    raw.copy_from_slice(&data[at..at + 17]);
    DateTime17::from_bytes(&raw, base + at as u64)
}

impl PrimaryVolumeDescriptor {
    /// Parse a full 2048-byte descriptor read from `lba`
    pub fn parse(data: &[u8], lba: u64) -> Result<Self> {
        let base = lba * SECTOR_SIZE as u64;
        if data.len() < SECTOR_SIZE {
            return Err(Iso9660Error::format(
                Structure::PrimaryVolumeDescriptor,
                base,
                "descriptor shorter than one sector",
            ));
        }
        if data[0] != VolumeDescriptorType::Primary as u8 {
            return Err(Iso9660Error::format(
                Structure::PrimaryVolumeDescriptor,
                base,
                "type code is not 1",
            ));
        }

        let logical_block_size = endian::read_u16(data, 128, "logical block size", base)?;
        if logical_block_size as usize != SECTOR_SIZE {
            return Err(Iso9660Error::format(
                Structure::PrimaryVolumeDescriptor,
                base + 128,
                "logical block size is not 2048",
            ));
        }

        let (root_directory_record, _) = DirectoryRecord::parse(
            &data[ROOT_RECORD..ROOT_RECORD + DirectoryRecord::MIN_LENGTH],
            base + ROOT_RECORD as u64,
        )?;
        if !root_directory_record.is_self() || !root_directory_record.is_directory() {
            return Err(Iso9660Error::format(
                Structure::PrimaryVolumeDescriptor,
                base + ROOT_RECORD as u64,
                "root directory record is not a directory",
            ));
        }

        let le = |at: usize| u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);
        let be = |at: usize| u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);

        Ok(Self {
            system_id: text(data, SYSTEM_ID),
            volume_id: text(data, VOLUME_ID),
            volume_space_size: endian::read_u32(data, 80, "volume space size", base)?,
            volume_set_size: endian::read_u16(data, 120, "volume set size", base)?,
            volume_sequence_number: endian::read_u16(data, 124, "volume sequence number", base)?,
            logical_block_size,
            path_table_size: endian::read_u32(data, 132, "path table size", base)?,
            type_l_path_table: le(140),
            optional_type_l_path_table: le(144),
            type_m_path_table: be(148),
            optional_type_m_path_table: be(152),
            root_directory_record,
            volume_set_id: text(data, VOLUME_SET_ID),
            publisher_id: text(data, PUBLISHER_ID),
            preparer_id: text(data, PREPARER_ID),
            application_id: text(data, APPLICATION_ID),
            copyright_file_id: text(data, COPYRIGHT_ID),
            abstract_file_id: text(data, ABSTRACT_ID),
            bibliographic_file_id: text(data, BIBLIOGRAPHIC_ID),
            creation: timestamp(data, TIMESTAMPS[0], base)?,
            modification: timestamp(data, TIMESTAMPS[1], base)?,
            expiration: timestamp(data, TIMESTAMPS[2], base)?,
            effective: timestamp(data, TIMESTAMPS[3], base)?,
        })
    }

    /// Encode as one 2048-byte sector
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; SECTOR_SIZE];
        out[0] = VolumeDescriptorType::Primary as u8;
        out[1..6].copy_from_slice(STANDARD_ID);
        out[6] = 1;

        pad_field(&mut out[SYSTEM_ID], &self.system_id);
        pad_field(&mut out[VOLUME_ID], &self.volume_id);
        endian::write_u32(&mut out[80..88], self.volume_space_size);
        endian::write_u16(&mut out[120..124], self.volume_set_size);
        endian::write_u16(&mut out[124..128], self.volume_sequence_number);
        endian::write_u16(&mut out[128..132], self.logical_block_size);
        endian::write_u32(&mut out[132..140], self.path_table_size);
        out[140..144].copy_from_slice(&self.type_l_path_table.to_le_bytes());
        out[144..148].copy_from_slice(&self.optional_type_l_path_table.to_le_bytes());
        out[148..152].copy_from_slice(&self.type_m_path_table.to_be_bytes());
        out[152..156].copy_from_slice(&self.optional_type_m_path_table.to_be_bytes());
        self.root_directory_record.write_to(&mut out[ROOT_RECORD..]);

        pad_field(&mut out[VOLUME_SET_ID], &self.volume_set_id);
        pad_field(&mut out[PUBLISHER_ID], &self.publisher_id);
        pad_field(&mut out[PREPARER_ID], &self.preparer_id);
        pad_field(&mut out[APPLICATION_ID], &self.application_id);
        pad_field(&mut out[COPYRIGHT_ID], &self.copyright_file_id);
        pad_field(&mut out[ABSTRACT_ID], &self.abstract_file_id);
        pad_field(&mut out[BIBLIOGRAPHIC_ID], &self.bibliographic_file_id);

        let stamps = [self.creation, self.modification, self.expiration, self.effective];
        for (at, stamp) in TIMESTAMPS.iter().zip(stamps) {
            out[*at..*at + 17].copy_from_slice(&stamp.to_bytes());
        }
        out[FILE_STRUCTURE_VERSION] = 1;
        out
    }
}
