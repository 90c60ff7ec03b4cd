//! String handling utilities
//!
//! ISO9660 uses various string encodings: ASCII, d-characters, a-characters.

use crate::error::{Iso9660Error, Result};
use alloc::vec::Vec;
use core::cmp::Ordering;

/// Identifier length rules applied when building a tree
///
/// Names that break the active policy are rejected, never rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamePolicy {
    /// Interchange level 1: directories up to 8 characters, files 8.3
    #[default]
    Level1,
    /// Interchange level 2: directories up to 31 characters, files up to 30
    Level2,
}

impl NamePolicy {
    fn max_directory_len(self) -> usize {
        match self {
            Self::Level1 => 8,
            Self::Level2 => 31,
        }
    }
}

/// Trim trailing spaces from byte slice
pub fn trim_trailing_spaces(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b' ' {
        end -= 1;
    }
    &bytes[..end]
}

/// Convert ISO9660 a-characters to string
///
/// a-characters: A-Z, 0-9, space, !, ", %, &, ', (, ), *, +, ,, -, ., /, :, ;, <, =, >, ?
pub fn achars_to_str(bytes: &[u8]) -> core::result::Result<&str, core::str::Utf8Error> {
    let trimmed = trim_trailing_spaces(bytes);
    core::str::from_utf8(trimmed)
}

/// Is `b` a d-character
pub fn is_d_char(b: u8) -> bool {
    b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_'
}

/// Is `b` an a-character
pub fn is_a_char(b: u8) -> bool {
    is_d_char(b) || b" !\"%&'()*+,-./:;<=>?".contains(&b)
}

/// Check a volume descriptor text field against its character set and width
pub fn validate_text_field(value: &str, width: usize, d_only: bool) -> Result<()> {
    if value.len() > width {
        return Err(Iso9660Error::invalid_name(value, "longer than its field"));
    }
    let ok = value
        .bytes()
        .all(|b| if d_only { is_d_char(b) || b == b' ' } else { is_a_char(b) });
    if !ok {
        let reason = if d_only {
            "outside d-characters (A-Z 0-9 _)"
        } else {
            "outside a-characters"
        };
        return Err(Iso9660Error::invalid_name(value, reason));
    }
    Ok(())
}

/// Write `value` into `dst`, padding the rest of the field with spaces
pub fn pad_field(dst: &mut [u8], value: &str) {
    dst.fill(b' ');
    let len = value.len().min(dst.len());
    dst[..len].copy_from_slice(&value.as_bytes()[..len]);
}

fn check_d_chars(name: &str, part: &str) -> Result<()> {
    if part.bytes().all(is_d_char) {
        Ok(())
    } else {
        Err(Iso9660Error::invalid_name(
            name,
            "outside d-characters (A-Z 0-9 _)",
        ))
    }
}

/// Validate a directory identifier under `policy`
pub fn validate_directory_identifier(name: &str, policy: NamePolicy) -> Result<()> {
    if name.is_empty() {
        return Err(Iso9660Error::invalid_name(name, "empty identifier"));
    }
    if name.len() > policy.max_directory_len() {
        return Err(Iso9660Error::invalid_name(name, "directory identifier too long"));
    }
    check_d_chars(name, name)
}

/// Validate a file identifier (`NAME` or `NAME.EXT`, no version) under `policy`
pub fn validate_file_identifier(name: &str, policy: NamePolicy) -> Result<()> {
    let (stem, ext) = match name.split_once('.') {
        Some((_, "")) => {
            return Err(Iso9660Error::invalid_name(name, "separator without extension"));
        }
        Some((stem, ext)) => (stem, ext),
        None => (name, ""),
    };
    if stem.is_empty() {
        return Err(Iso9660Error::invalid_name(name, "empty file name"));
    }
    if ext.contains('.') {
        return Err(Iso9660Error::invalid_name(name, "more than one separator"));
    }
    check_d_chars(name, stem)?;
    check_d_chars(name, ext)?;

    match policy {
        NamePolicy::Level1 if stem.len() > 8 => {
            Err(Iso9660Error::invalid_name(name, "file name longer than 8"))
        }
        NamePolicy::Level1 if ext.len() > 3 => {
            Err(Iso9660Error::invalid_name(name, "extension longer than 3"))
        }
        NamePolicy::Level2 if stem.len() + ext.len() > 30 => {
            Err(Iso9660Error::invalid_name(name, "file identifier longer than 30"))
        }
        _ => Ok(()),
    }
}

/// On-disk file identifier: always carries the separator, optionally `;1`
pub fn file_identifier_bytes(name: &str, version_suffix: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(name.len() + 3);
    out.extend_from_slice(name.as_bytes());
    if !name.contains('.') {
        out.push(b'.');
    }
    if version_suffix {
        out.extend_from_slice(b";1");
    }
    out
}

/// Strip version suffix from filename (e.g., "FILE.TXT;1" -> "FILE.TXT")
/// Also removes trailing dot if present (e.g., "FILE.;1" -> "FILE")
pub fn strip_version(name: &str) -> &str {
    let base = name.split(';').next().unwrap_or(name);
    if let Some(stripped) = base.strip_suffix('.') {
        stripped
    } else {
        base
    }
}

/// Compare two identifiers as if the shorter were padded with spaces
pub fn compare_padded(a: &[u8], b: &[u8]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(b' ');
        let y = b.get(i).copied().unwrap_or(b' ');
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// ECMA-119 9.3 ordering of file identifiers: name, then extension, then
/// version in descending order
pub fn compare_file_identifiers(a: &[u8], b: &[u8]) -> Ordering {
    fn split(id: &[u8]) -> (&[u8], &[u8], u32) {
        let (body, version) = match id.iter().rposition(|&c| c == b';') {
            Some(at) => {
                let digits = &id[at + 1..];
                let version = digits
                    .iter()
                    .take_while(|c| c.is_ascii_digit())
                    .fold(0u32, |acc, &c| acc.saturating_mul(10).saturating_add((c - b'0') as u32));
                (&id[..at], version)
            }
            None => (id, 0),
        };
        match body.iter().position(|&c| c == b'.') {
            Some(at) => (&body[..at], &body[at + 1..], version),
            None => (body, &[][..], version),
        }
    }

    let (name_a, ext_a, ver_a) = split(a);
    let (name_b, ext_b, ver_b) = split(b);
    compare_padded(name_a, name_b)
        .then_with(|| compare_padded(ext_a, ext_b))
        .then_with(|| ver_b.cmp(&ver_a))
}
