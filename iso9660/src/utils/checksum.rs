//! Checksum calculations for validation

/// Calculate 16-bit checksum (sum of 16-bit little-endian words)
///
/// Used for El Torito validation entry
pub fn checksum_16(data: &[u8]) -> u16 {
    let mut sum = 0u16;

    for chunk in data.chunks_exact(2) {
        let word = u16::from_le_bytes([chunk[0], chunk[1]]);
        sum = sum.wrapping_add(word);
    }

    sum
}

/// Verify checksum is zero (validation check)
pub fn verify_checksum_16(data: &[u8]) -> bool {
    checksum_16(data) == 0
}

/// Calculate checksum that makes total sum zero
pub fn calculate_complement_16(data: &[u8]) -> u16 {
    let sum = checksum_16(data);
    0u16.wrapping_sub(sum)
}

/// Sum of 32-bit little-endian words; a trailing partial word is zero-extended
///
/// Used for the boot info table checksum
pub fn checksum_32(data: &[u8]) -> u32 {
    let mut sum = 0u32;
    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        sum = sum.wrapping_add(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    let rest = chunks.remainder();
    if !rest.is_empty() {
        let mut word = [0u8; 4];
        word[..rest.len()].copy_from_slice(rest);
        sum = sum.wrapping_add(u32::from_le_bytes(word));
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_16() {
        let data = [0x01, 0x00, 0x02, 0x00];
        assert_eq!(checksum_16(&data), 0x0003);
    }

    #[test]
    fn test_verify_checksum() {
        let data = [0x01, 0x00, 0xFF, 0xFF];
        assert_eq!(checksum_16(&data), 0x0000);
        assert!(verify_checksum_16(&data));
    }

    #[test]
    fn test_complement_zeroes_sum() {
        let mut data = [0x12, 0x34, 0x56, 0x78, 0x00, 0x00];
        let word = calculate_complement_16(&data);
        data[4..6].copy_from_slice(&word.to_le_bytes());
        assert!(verify_checksum_16(&data));
    }

    #[test]
    fn test_checksum_32_partial_word() {
        let data = [1, 0, 0, 0, 2, 0, 0, 0, 3];
        assert_eq!(checksum_32(&data), 6);
    }
}
