//! Encode and decode settings

use crate::error::Result;
use crate::utils::datetime::DateTime17;
use crate::utils::string::validate_text_field;
use alloc::string::String;
use alloc::vec::Vec;

/// Settings for writing an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// System identifier (a-characters, 32)
    pub system_id: String,
    /// Volume identifier (d-characters, 32)
    pub volume_id: String,
    /// Volume set identifier (d-characters, 128)
    pub volume_set_id: String,
    /// Publisher identifier (a-characters, 128)
    pub publisher_id: String,
    /// Data preparer identifier (a-characters, 128)
    pub preparer_id: String,
    /// Application identifier (a-characters, 128)
    pub application_id: String,
    /// Copyright file identifier (37)
    pub copyright_file_id: String,
    /// Abstract file identifier (37)
    pub abstract_file_id: String,
    /// Bibliographic file identifier (37)
    pub bibliographic_file_id: String,

    /// Volume creation time
    pub creation: DateTime17,
    /// Volume modification time
    pub modification: DateTime17,
    /// Volume expiration time
    pub expiration: DateTime17,
    /// Volume effective time
    pub effective: DateTime17,

    /// Largest volume, in blocks, the layout may use
    pub volume_space_limit: Option<u64>,

    /// Bytes for LBA 0-15 (at most 32 KiB; zeros when `None`)
    pub system_area: Option<Vec<u8>>,

    /// ID string of the boot catalog validation entry
    pub catalog_id: String,

    /// Append ";1" to file identifiers
    pub version_suffix: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            system_id: String::new(),
            volume_id: String::from("ISOIMAGE"),
            volume_set_id: String::new(),
            publisher_id: String::new(),
            preparer_id: String::new(),
            application_id: String::new(),
            copyright_file_id: String::new(),
            abstract_file_id: String::new(),
            bibliographic_file_id: String::new(),
            creation: DateTime17::default(),
            modification: DateTime17::default(),
            expiration: DateTime17::default(),
            effective: DateTime17::default(),
            volume_space_limit: None,
            system_area: None,
            catalog_id: String::new(),
            version_suffix: true,
        }
    }
}

impl BuildOptions {
    /// Check every identifier against its character set and field width
    pub fn validate(&self) -> Result<()> {
        validate_text_field(&self.system_id, 32, false)?;
        validate_text_field(&self.volume_id, 32, true)?;
        validate_text_field(&self.volume_set_id, 128, true)?;
        validate_text_field(&self.publisher_id, 128, false)?;
        validate_text_field(&self.preparer_id, 128, false)?;
        validate_text_field(&self.application_id, 128, false)?;
        validate_text_field(&self.copyright_file_id, 37, false)?;
        validate_text_field(&self.abstract_file_id, 37, false)?;
        validate_text_field(&self.bibliographic_file_id, 37, false)?;
        validate_text_field(&self.catalog_id, 24, false)
    }
}

/// Settings for reading an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Read the type M path table too and require both to match type L and
    /// the directory records
    pub verify_path_tables: bool,

    /// Decode the El Torito boot catalog when a boot record is present
    pub resolve_boot_catalog: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            verify_path_tables: true,
            resolve_boot_catalog: true,
        }
    }
}
