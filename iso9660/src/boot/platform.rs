//! Boot platform identifiers

use crate::types::BootPlatform;

impl BootPlatform {
    /// Parse from validation entry / section header platform ID
    pub fn from_id(id: u8) -> Self {
        match id {
            0x00 => BootPlatform::X86,
            0x01 => BootPlatform::PowerPC,
            0x02 => BootPlatform::Mac,
            0xEF => BootPlatform::Efi,
            other => BootPlatform::Other(other),
        }
    }

    /// Platform ID byte
    pub fn id(self) -> u8 {
        match self {
            BootPlatform::X86 => 0x00,
            BootPlatform::PowerPC => 0x01,
            BootPlatform::Mac => 0x02,
            BootPlatform::Efi => 0xEF,
            BootPlatform::Other(id) => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_ids() {
        assert_eq!(BootPlatform::from_id(0xEF), BootPlatform::Efi);
        assert_eq!(BootPlatform::Efi.id(), 0xEF);
        assert_eq!(BootPlatform::from_id(0x42), BootPlatform::Other(0x42));
        assert_eq!(BootPlatform::from_id(BootPlatform::Mac.id()), BootPlatform::Mac);
    }
}
