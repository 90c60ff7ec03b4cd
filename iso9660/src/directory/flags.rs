//! Directory record file flags (BP 26)

use crate::types::FileFlags;

impl FileFlags {
    /// Hidden (existence bit)
    pub const HIDDEN: u8 = 0x01;
    /// Directory
    pub const DIRECTORY: u8 = 0x02;
    /// Associated file
    pub const ASSOCIATED: u8 = 0x04;
    /// Record format in extended attributes
    pub const RECORD: u8 = 0x08;
    /// Protection in extended attributes
    pub const PROTECTION: u8 = 0x10;
    /// Not the final record of a multi-extent file
    pub const MULTI_EXTENT: u8 = 0x80;

    /// Decode the flags byte
    pub fn from_byte(byte: u8) -> Self {
        Self {
            hidden: byte & Self::HIDDEN != 0,
            directory: byte & Self::DIRECTORY != 0,
            associated: byte & Self::ASSOCIATED != 0,
            extended_format: byte & Self::RECORD != 0,
            extended_permissions: byte & Self::PROTECTION != 0,
            not_final: byte & Self::MULTI_EXTENT != 0,
        }
    }

    /// Encode the flags byte
    pub fn to_byte(self) -> u8 {
        let mut byte = 0;
        if self.hidden {
            byte |= Self::HIDDEN;
        }
        if self.directory {
            byte |= Self::DIRECTORY;
        }
        if self.associated {
            byte |= Self::ASSOCIATED;
        }
        if self.extended_format {
            byte |= Self::RECORD;
        }
        if self.extended_permissions {
            byte |= Self::PROTECTION;
        }
        if self.not_final {
            byte |= Self::MULTI_EXTENT;
        }
        byte
    }
}
