//! Directory Record structure
//!
//! Directory records describe files and subdirectories.
//!
//! ```text
//! BP 1      record length          BP 19-25  recording date (7 bytes)
//! BP 2      ext. attribute length  BP 26     file flags
//! BP 3-10   extent LBA (both)      BP 27-28  unit size, interleave gap
//! BP 11-18  data length (both)     BP 29-32  volume sequence (both)
//! BP 33     identifier length      BP 34-    identifier, pad, system use
//! ```

use crate::error::{Iso9660Error, Result, Structure};
use crate::file::extent::Extent;
use crate::types::FileFlags;
use crate::utils::datetime::DateTime7;
use crate::utils::endian;
use crate::utils::string;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// Decoded directory record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    /// Extended attribute record length
    pub extended_attr_length: u8,

    /// Extent location
    pub extent_lba: u32,

    /// Data length in bytes
    pub data_length: u32,

    /// Recording date and time
    pub recorded: DateTime7,

    /// File flags
    pub flags: FileFlags,

    /// File unit size (interleaved files)
    pub file_unit_size: u8,

    /// Interleave gap size
    pub interleave_gap: u8,

    /// Volume sequence number
    pub volume_sequence: u16,

    /// Raw file identifier (`0x00` for ".", `0x01` for "..")
    pub identifier: Vec<u8>,

    /// System use area
    pub system_use: Vec<u8>,
}

impl DirectoryRecord {
    /// Fixed part before the identifier
    pub const HEADER_LEN: usize = 33;

    /// Minimum record length
    pub const MIN_LENGTH: usize = 34;

    /// Identifier of the "." record
    pub const SELF_ID: u8 = 0x00;

    /// Identifier of the ".." record
    pub const PARENT_ID: u8 = 0x01;

    /// Record for a directory or file with the given extent
    pub fn new(identifier: Vec<u8>, extent: Extent, flags: FileFlags, recorded: DateTime7) -> Self {
        Self {
            extended_attr_length: 0,
            extent_lba: extent.lba,
            data_length: extent.length,
            recorded,
            flags,
            file_unit_size: 0,
            interleave_gap: 0,
            volume_sequence: 1,
            identifier,
            system_use: Vec::new(),
        }
    }

    /// Encoded length of a record with an identifier of `id_len` bytes
    pub fn length_for(id_len: usize) -> usize {
        Self::HEADER_LEN + id_len + (id_len + 1) % 2
    }

    /// Encoded length of this record
    pub fn encoded_len(&self) -> usize {
        Self::length_for(self.identifier.len()) + self.system_use.len()
    }

    /// Parse one record from the start of `data`
    ///
    /// `data` must end at the block boundary so a record that runs past it is
    /// reported; `offset` is the absolute position of `data[0]`.
    /// Returns the record and its length.
    pub fn parse(data: &[u8], offset: u64) -> Result<(Self, usize)> {
        let length = *data.first().ok_or(Iso9660Error::format(
            Structure::DirectoryRecord,
            offset,
            "missing record",
        ))? as usize;

        if length < Self::MIN_LENGTH {
            return Err(Iso9660Error::format(
                Structure::DirectoryRecord,
                offset,
                "record shorter than 34 bytes",
            ));
        }
        if length > data.len() {
            return Err(Iso9660Error::format(
                Structure::DirectoryRecord,
                offset,
                "record crosses a block boundary",
            ));
        }

        let id_len = data[32] as usize;
        if id_len == 0 {
            return Err(Iso9660Error::format(
                Structure::DirectoryRecord,
                offset + 32,
                "empty file identifier",
            ));
        }
        if Self::length_for(id_len) > length {
            return Err(Iso9660Error::format(
                Structure::DirectoryRecord,
                offset + 32,
                "identifier overruns record",
            ));
        }

        let mut recorded = [0u8; 7];
        recorded.copy_from_slice(&data[18..25]);
        let id_end = Self::HEADER_LEN + id_len;

        let record = Self {
            extended_attr_length: data[1],
            extent_lba: endian::read_u32(data, 2, "extent location", offset)?,
            data_length: endian::read_u32(data, 10, "data length", offset)?,
            recorded: DateTime7::from_bytes(&recorded),
            flags: FileFlags::from_byte(data[25]),
            file_unit_size: data[26],
            interleave_gap: data[27],
            volume_sequence: endian::read_u16(data, 28, "volume sequence number", offset)?,
            identifier: data[Self::HEADER_LEN..id_end].to_vec(),
            system_use: data[Self::length_for(id_len)..length].to_vec(),
        };
        Ok((record, length))
    }

    /// Encode into `dst`, which must hold at least `encoded_len()` bytes
    pub fn write_to(&self, dst: &mut [u8]) {
        let length = self.encoded_len();
        let dst = &mut dst[..length];
        dst.fill(0);
        dst[0] = length as u8;
        dst[1] = self.extended_attr_length;
        endian::write_u32(&mut dst[2..10], self.extent_lba);
        endian::write_u32(&mut dst[10..18], self.data_length);
        dst[18..25].copy_from_slice(&self.recorded.to_bytes());
        dst[25] = self.flags.to_byte();
        dst[26] = self.file_unit_size;
        dst[27] = self.interleave_gap;
        endian::write_u16(&mut dst[28..32], self.volume_sequence);
        dst[32] = self.identifier.len() as u8;
        let id_end = Self::HEADER_LEN + self.identifier.len();
        dst[Self::HEADER_LEN..id_end].copy_from_slice(&self.identifier);
        let su_start = Self::length_for(self.identifier.len());
        dst[su_start..].copy_from_slice(&self.system_use);
    }

    /// Encode into a new buffer
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.encoded_len()];
        self.write_to(&mut out);
        out
    }

    /// Is this the "." record
    pub fn is_self(&self) -> bool {
        self.identifier == [Self::SELF_ID]
    }

    /// Is this the ".." record
    pub fn is_parent(&self) -> bool {
        self.identifier == [Self::PARENT_ID]
    }

    /// Is this a directory?
    pub fn is_directory(&self) -> bool {
        self.flags.directory
    }

    /// Extent described by this record
    pub fn extent(&self) -> Extent {
        Extent::new(self.extent_lba, self.data_length)
    }

    /// Identifier as a name, without version suffix or trailing separator
    pub fn name(&self) -> String {
        match core::str::from_utf8(&self.identifier) {
            Ok(s) if self.flags.directory => String::from(s),
            Ok(s) => String::from(string::strip_version(s)),
            Err(_) => String::from_utf8_lossy(&self.identifier).into_owned(),
        }
    }
}
