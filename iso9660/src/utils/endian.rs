//! Both-endian field codec
//!
//! ECMA-119 stores many integers twice: little-endian immediately followed by
//! big-endian. Decoding checks both halves and reports disagreement instead of
//! silently preferring one side.

use crate::error::{Iso9660Error, Result};

/// Both-endian 32-bit value (stored as LE then BE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BothEndian32 {
    /// Little-endian value
    pub le: [u8; 4],
    /// Big-endian value
    pub be: [u8; 4],
}

impl BothEndian32 {
    /// Encoded width in bytes
    pub const SIZE: usize = 8;

    /// Encode a value in both byte orders
    pub fn new(value: u32) -> Self {
        Self {
            le: value.to_le_bytes(),
            be: value.to_be_bytes(),
        }
    }

    /// Split an 8-byte window into its halves
    pub fn from_bytes(bytes: &[u8; 8]) -> Self {
        Self {
            le: [bytes[0], bytes[1], bytes[2], bytes[3]],
            be: [bytes[4], bytes[5], bytes[6], bytes[7]],
        }
    }

    /// Get value if both halves agree
    pub fn get(&self) -> Option<u32> {
        let le = u32::from_le_bytes(self.le);
        (le == u32::from_be_bytes(self.be)).then_some(le)
    }

    /// Get value or report the mismatch for `field` at absolute `offset`
    pub fn decode(&self, field: &'static str, offset: u64) -> Result<u32> {
        self.get().ok_or(Iso9660Error::EndiannessMismatch {
            field,
            offset,
            little: u32::from_le_bytes(self.le),
            big: u32::from_be_bytes(self.be),
        })
    }

    /// Raw 8-byte encoding
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[..4].copy_from_slice(&self.le);
        out[4..].copy_from_slice(&self.be);
        out
    }
}

/// Both-endian 16-bit value (stored as LE then BE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BothEndian16 {
    /// Little-endian value
    pub le: [u8; 2],
    /// Big-endian value
    pub be: [u8; 2],
}

impl BothEndian16 {
    /// Encoded width in bytes
    pub const SIZE: usize = 4;

    /// Encode a value in both byte orders
    pub fn new(value: u16) -> Self {
        Self {
            le: value.to_le_bytes(),
            be: value.to_be_bytes(),
        }
    }

    /// Split a 4-byte window into its halves
    pub fn from_bytes(bytes: &[u8; 4]) -> Self {
        Self {
            le: [bytes[0], bytes[1]],
            be: [bytes[2], bytes[3]],
        }
    }

    /// Get value if both halves agree
    pub fn get(&self) -> Option<u16> {
        let le = u16::from_le_bytes(self.le);
        (le == u16::from_be_bytes(self.be)).then_some(le)
    }

    /// Get value or report the mismatch for `field` at absolute `offset`
    pub fn decode(&self, field: &'static str, offset: u64) -> Result<u16> {
        self.get().ok_or(Iso9660Error::EndiannessMismatch {
            field,
            offset,
            little: u16::from_le_bytes(self.le) as u32,
            big: u16::from_be_bytes(self.be) as u32,
        })
    }

    /// Raw 4-byte encoding
    pub fn to_bytes(&self) -> [u8; 4] {
        let mut out = [0u8; 4];
        out[..2].copy_from_slice(&self.le);
        out[2..].copy_from_slice(&self.be);
        out
    }
}

/// Read a both-endian u32 at `at` within `buf`; `base` is the absolute offset of `buf`
pub fn read_u32(buf: &[u8], at: usize, field: &'static str, base: u64) -> Result<u32> {
    let window: &[u8; 8] = buf
        .get(at..at + BothEndian32::SIZE)
        .and_then(|w| w.try_into().ok())
        .ok_or(Iso9660Error::format(
            crate::error::Structure::VolumeDescriptor,
            base + at as u64,
            "truncated both-endian field",
        ))?;
    BothEndian32::from_bytes(window).decode(field, base + at as u64)
}

/// Read a both-endian u16 at `at` within `buf`; `base` is the absolute offset of `buf`
pub fn read_u16(buf: &[u8], at: usize, field: &'static str, base: u64) -> Result<u16> {
    let window: &[u8; 4] = buf
        .get(at..at + BothEndian16::SIZE)
        .and_then(|w| w.try_into().ok())
        .ok_or(Iso9660Error::format(
            crate::error::Structure::VolumeDescriptor,
            base + at as u64,
            "truncated both-endian field",
        ))?;
    BothEndian16::from_bytes(window).decode(field, base + at as u64)
}

/// Write a both-endian u32 into the first 8 bytes of `dst`
pub fn write_u32(dst: &mut [u8], value: u32) {
    dst[..BothEndian32::SIZE].copy_from_slice(&BothEndian32::new(value).to_bytes());
}

/// Write a both-endian u16 into the first 4 bytes of `dst`
pub fn write_u16(dst: &mut [u8], value: u16) {
    dst[..BothEndian16::SIZE].copy_from_slice(&BothEndian16::new(value).to_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let field = BothEndian32::new(0x0102_0304);
        assert_eq!(field.to_bytes(), [4, 3, 2, 1, 1, 2, 3, 4]);
        assert_eq!(BothEndian16::new(2048).to_bytes(), [0x00, 0x08, 0x08, 0x00]);
    }

    #[test]
    fn test_decode_agreeing_halves() {
        let mut buf = [0u8; 12];
        write_u32(&mut buf[2..], 0xDEAD_BEEF);
        assert_eq!(read_u32(&buf, 2, "extent", 0).unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn test_decode_mismatch_reports_field() {
        let mut buf = [0u8; 4];
        buf[..2].copy_from_slice(&7u16.to_le_bytes());
        buf[2..].copy_from_slice(&8u16.to_be_bytes());
        let err = read_u16(&buf, 0, "volume_sequence", 100).unwrap_err();
        assert_eq!(
            err,
            Iso9660Error::EndiannessMismatch {
                field: "volume_sequence",
                offset: 100,
                little: 7,
                big: 8,
            }
        );
    }

    #[test]
    fn test_truncated_window() {
        let buf = [0u8; 6];
        assert!(matches!(
            read_u32(&buf, 0, "size", 0),
            Err(Iso9660Error::Format { .. })
        ));
    }
}
