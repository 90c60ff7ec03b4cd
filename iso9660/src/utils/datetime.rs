//! Date/time parsing
//!
//! ISO9660 has two datetime formats: 7-byte and 17-byte.

use crate::error::{Iso9660Error, Result, Structure};

/// 7-byte directory record datetime
///
/// All-zero means "not specified".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTime7 {
    /// Years since 1900
    pub year: u8,

    /// Month (1-12)
    pub month: u8,

    /// Day (1-31)
    pub day: u8,

    /// Hour (0-23)
    pub hour: u8,

    /// Minute (0-59)
    pub minute: u8,

    /// Second (0-59)
    pub second: u8,

    /// GMT offset in 15-minute intervals (-48 to +52)
    pub gmt_offset: i8,
}

impl DateTime7 {
    /// Build from a calendar year (1900-2155) and the remaining fields
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year: year.saturating_sub(1900).min(255) as u8,
            month,
            day,
            hour,
            minute,
            second,
            gmt_offset: 0,
        }
    }

    /// Parse from 7-byte array
    pub fn from_bytes(bytes: &[u8; 7]) -> Self {
        Self {
            year: bytes[0],
            month: bytes[1],
            day: bytes[2],
            hour: bytes[3],
            minute: bytes[4],
            second: bytes[5],
            gmt_offset: bytes[6] as i8,
        }
    }

    /// Encode as 7 bytes
    pub fn to_bytes(&self) -> [u8; 7] {
        [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.gmt_offset as u8,
        ]
    }

    /// Get full year (1900 + year)
    pub fn full_year(&self) -> u16 {
        1900 + self.year as u16
    }
}

/// 17-byte ASCII datetime (volume descriptors)
///
/// The all-zero value encodes as sixteen ASCII '0' digits, which ECMA-119
/// defines as "not specified".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTime17 {
    /// Year (4 ASCII digits)
    pub year: u16,

    /// Month (2 ASCII digits, 1-12)
    pub month: u8,

    /// Day (2 ASCII digits, 1-31)
    pub day: u8,

    /// Hour (2 ASCII digits, 0-23)
    pub hour: u8,

    /// Minute (2 ASCII digits, 0-59)
    pub minute: u8,

    /// Second (2 ASCII digits, 0-59)
    pub second: u8,

    /// Hundredths (2 ASCII digits)
    pub hundredths: u8,

    /// GMT offset in 15-minute intervals
    pub gmt_offset: i8,
}

impl DateTime17 {
    /// Build a timestamp with zero hundredths and GMT offset
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            hundredths: 0,
            gmt_offset: 0,
        }
    }

    /// Is this the "not specified" value
    pub fn is_unspecified(&self) -> bool {
        *self == Self::default()
    }

    /// Parse from 17-byte ASCII string
    ///
    /// Accepts decimal digits, or sixteen NUL bytes which some writers use for
    /// "not specified". `offset` is the absolute position used in errors.
    pub fn from_bytes(bytes: &[u8; 17], offset: u64) -> Result<Self> {
        if bytes[..16].iter().all(|&b| b == 0) {
            return Ok(Self {
                gmt_offset: bytes[16] as i8,
                ..Self::default()
            });
        }

        let mut digits = [0u8; 16];
        for (i, &b) in bytes[..16].iter().enumerate() {
            if !b.is_ascii_digit() {
                return Err(Iso9660Error::format(
                    Structure::Timestamp,
                    offset + i as u64,
                    "non-digit in decimal timestamp",
                ));
            }
            digits[i] = b - b'0';
        }
        let two = |at: usize| digits[at] * 10 + digits[at + 1];

        Ok(Self {
            year: digits[..4].iter().fold(0u16, |acc, &d| acc * 10 + d as u16),
            month: two(4),
            day: two(6),
            hour: two(8),
            minute: two(10),
            second: two(12),
            hundredths: two(14),
            gmt_offset: bytes[16] as i8,
        })
    }

    /// Encode as 16 ASCII digits plus the GMT offset byte
    pub fn to_bytes(&self) -> [u8; 17] {
        let mut out = [b'0'; 17];
        let mut put = |at: usize, width: usize, value: u32| {
            let mut value = value;
            for i in (0..width).rev() {
                out[at + i] = b'0' + (value % 10) as u8;
                value /= 10;
            }
        };
        put(0, 4, self.year as u32);
        put(4, 2, self.month as u32);
        put(6, 2, self.day as u32);
        put(8, 2, self.hour as u32);
        put(10, 2, self.minute as u32);
        put(12, 2, self.second as u32);
        put(14, 2, self.hundredths as u32);
        out[16] = self.gmt_offset as u8;
        out
    }
}
