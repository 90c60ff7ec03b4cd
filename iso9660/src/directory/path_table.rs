//! Path tables (ECMA-119 9.4)
//!
//! A flat list of every directory, ordered by parent number then identifier.
//! The type L table stores numbers little-endian, the type M table big-endian;
//! both carry the same entries.

use crate::directory::tree::{DirectoryTree, NodeId};
use crate::error::{Iso9660Error, Result, Structure};
use crate::store::SectorStore;
use crate::types::VolumeInfo;
use crate::utils::sector::sectors_for_bytes;
use crate::utils::string::compare_padded;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;

/// Byte order of a path table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathTableType {
    /// Type L: little-endian numbers
    LittleEndian,
    /// Type M: big-endian numbers
    BigEndian,
}

impl PathTableType {
    fn read_u32(self, bytes: &[u8]) -> u32 {
        let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
        match self {
            Self::LittleEndian => u32::from_le_bytes(raw),
            Self::BigEndian => u32::from_be_bytes(raw),
        }
    }

    fn read_u16(self, bytes: &[u8]) -> u16 {
        let raw = [bytes[0], bytes[1]];
        match self {
            Self::LittleEndian => u16::from_le_bytes(raw),
            Self::BigEndian => u16::from_be_bytes(raw),
        }
    }

    fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self {
            Self::LittleEndian => value.to_le_bytes(),
            Self::BigEndian => value.to_be_bytes(),
        }
    }

    fn u16_bytes(self, value: u16) -> [u8; 2] {
        match self {
            Self::LittleEndian => value.to_le_bytes(),
            Self::BigEndian => value.to_be_bytes(),
        }
    }
}

/// One path table record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTableEntry {
    /// Extended attribute record length
    pub extended_attr_length: u8,

    /// Extent location of the directory
    pub extent_lba: u32,

    /// 1-based number of the parent directory (root is its own parent)
    pub parent: u16,

    /// Directory identifier (`[0x00]` for the root)
    pub identifier: Vec<u8>,
}

impl PathTableEntry {
    /// Fixed part before the identifier
    pub const HEADER_LEN: usize = 8;

    /// Encoded length including the pad byte after odd identifiers
    pub fn encoded_len(&self) -> usize {
        let id_len = self.identifier.len();
        Self::HEADER_LEN + id_len + id_len % 2
    }

    /// Is this the root entry
    pub fn is_root(&self) -> bool {
        self.identifier == [0x00]
    }

    /// Identifier as text ("" for the root)
    pub fn name(&self) -> String {
        if self.is_root() {
            return String::new();
        }
        String::from_utf8_lossy(&self.identifier).into_owned()
    }
}

/// Decoded or built path table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathTable {
    entries: Vec<PathTableEntry>,
}

impl PathTable {
    /// Wrap entries as they are
    pub fn from_entries(entries: Vec<PathTableEntry>) -> Self {
        Self { entries }
    }

    /// Entries in table order; directory number N is `entries()[N - 1]`
    pub fn entries(&self) -> &[PathTableEntry] {
        &self.entries
    }

    /// Entry for a 1-based directory number
    pub fn get(&self, number: u16) -> Option<&PathTableEntry> {
        (number as usize).checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Size of the encoded table in bytes (the PVD path table size)
    pub fn size(&self) -> u32 {
        self.entries.iter().map(|e| e.encoded_len() as u32).sum()
    }

    /// Decode `bytes` (exactly the declared table size)
    ///
    /// `base` is the absolute offset of `bytes[0]`.
    pub fn parse(bytes: &[u8], kind: PathTableType, base: u64) -> Result<Self> {
        let mut entries = Vec::new();
        let mut pos = 0usize;

        while pos < bytes.len() {
            let at = base + pos as u64;
            let rest = &bytes[pos..];
            if rest.len() < PathTableEntry::HEADER_LEN {
                return Err(Iso9660Error::format(Structure::PathTable, at, "truncated entry"));
            }
            let id_len = rest[0] as usize;
            if id_len == 0 {
                return Err(Iso9660Error::format(
                    Structure::PathTable,
                    at,
                    "zero-length directory identifier",
                ));
            }
            let id_end = PathTableEntry::HEADER_LEN + id_len;
            if id_end > rest.len() {
                return Err(Iso9660Error::format(
                    Structure::PathTable,
                    at,
                    "identifier overruns table",
                ));
            }

            let entry = PathTableEntry {
                extended_attr_length: rest[1],
                extent_lba: kind.read_u32(&rest[2..6]),
                parent: kind.read_u16(&rest[6..8]),
                identifier: rest[PathTableEntry::HEADER_LEN..id_end].to_vec(),
            };
            let number = entries.len() + 1;
            if entry.parent == 0 || entry.parent as usize > number {
                return Err(Iso9660Error::format(
                    Structure::PathTable,
                    at + 6,
                    "parent number out of range",
                ));
            }
            pos += entry.encoded_len().min(rest.len());
            entries.push(entry);
        }

        if entries.first().map_or(true, |root| root.parent != 1) {
            return Err(Iso9660Error::format(
                Structure::PathTable,
                base,
                "first entry is not the root",
            ));
        }
        log::trace!("path table at {}: {} entries", base, entries.len());
        Ok(Self { entries })
    }

    /// Encode with the given byte order (no trailing block padding)
    pub fn encode(&self, kind: PathTableType) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size() as usize);
        for entry in &self.entries {
            out.push(entry.identifier.len() as u8);
            out.push(entry.extended_attr_length);
            out.extend_from_slice(&kind.u32_bytes(entry.extent_lba));
            out.extend_from_slice(&kind.u16_bytes(entry.parent));
            out.extend_from_slice(&entry.identifier);
            if entry.identifier.len() % 2 == 1 {
                out.push(0);
            }
        }
        out
    }

    /// Build the table for `order` (breadth-first directory order of `tree`)
    ///
    /// `extent_of` supplies each directory's LBA; during sizing any value will do.
    /// Directory numbers are 16 bits, so at most 65535 directories fit.
    pub fn build(
        tree: &DirectoryTree,
        order: &[NodeId],
        extent_of: impl Fn(NodeId) -> u32,
    ) -> Result<Self> {
        let numbers: BTreeMap<NodeId, u16> = order
            .iter()
            .enumerate()
            .map(|(i, &id)| {
                u16::try_from(i + 1)
                    .map(|number| (id, number))
                    .map_err(|_| Iso9660Error::TooManyDirectories(order.len()))
            })
            .collect::<Result<_>>()?;

        let entries = order
            .iter()
            .map(|&id| {
                let node = tree.node(id);
                let parent = tree
                    .parent(id)
                    .and_then(|p| numbers.get(&p).copied())
                    .unwrap_or(1);
                let identifier = if id == tree.root() {
                    alloc::vec![0x00]
                } else {
                    node.name().as_bytes().to_vec()
                };
                PathTableEntry {
                    extended_attr_length: 0,
                    extent_lba: extent_of(id),
                    parent,
                    identifier,
                }
            })
            .collect();

        Ok(Self { entries })
    }

    /// Are entries sorted by (parent number, identifier) with the root first
    pub fn is_canonically_ordered(&self) -> bool {
        let Some(root) = self.entries.first() else {
            return false;
        };
        if !root.is_root() || root.parent != 1 {
            return false;
        }
        self.entries[1..].windows(2).all(|pair| {
            let order = pair[0]
                .parent
                .cmp(&pair[1].parent)
                .then_with(|| compare_padded(&pair[0].identifier, &pair[1].identifier));
            order == Ordering::Less
        })
    }

    /// Absolute path ("/", "/SUB/DEEPER") of a directory number
    pub fn path(&self, number: u16) -> Result<String> {
        let mut parts = Vec::new();
        let mut current = number;
        loop {
            let entry = self.get(current).ok_or(Iso9660Error::NotFound)?;
            if current == 1 {
                break;
            }
            if parts.len() > self.entries.len() {
                return Err(Iso9660Error::format(
                    Structure::PathTable,
                    0,
                    "parent chain does not reach the root",
                ));
            }
            parts.push(entry.name());
            current = entry.parent;
        }

        let mut path = String::new();
        for part in parts.iter().rev() {
            path.push('/');
            path.push_str(part);
        }
        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }

    /// Directory number of an absolute path, matched case-insensitively
    pub fn find(&self, path: &str) -> Option<u16> {
        let mut current = 1u16;
        for component in path.split('/').filter(|c| !c.is_empty()) {
            let (index, _) = self.entries.iter().enumerate().skip(1).find(|(_, e)| {
                e.parent == current && e.name().eq_ignore_ascii_case(component)
            })?;
            current = u16::try_from(index + 1).ok()?;
        }
        Some(current)
    }

    /// Require the table to describe exactly the directories of `tree`
    ///
    /// Each entry must name a directory of its parent entry's directory and
    /// carry that directory's extent. `base` is the absolute offset of the
    /// table, used for error offsets.
    pub fn check_tree(&self, tree: &DirectoryTree, base: u64) -> Result<()> {
        let mismatch = |offset: u64, reason| {
            Err(Iso9660Error::format(Structure::PathTable, base + offset, reason))
        };

        let mut nodes: Vec<NodeId> = Vec::with_capacity(self.entries.len());
        let mut offset = 0u64;
        for (index, entry) in self.entries.iter().enumerate() {
            let node = if index == 0 {
                tree.root()
            } else {
                let parent = (entry.parent as usize)
                    .checked_sub(1)
                    .and_then(|i| nodes.get(i).copied());
                let Some(parent) = parent else {
                    return mismatch(offset, "parent number not yet defined");
                };
                match tree.child(parent, &entry.name()) {
                    Some(child) if tree.node(child).is_directory() => child,
                    _ => return mismatch(offset, "entry has no matching directory"),
                }
            };
            if tree.node(node).extent().map(|e| e.lba) != Some(entry.extent_lba) {
                return mismatch(offset, "extent differs from the directory record");
            }
            nodes.push(node);
            offset += entry.encoded_len() as u64;
        }

        let directories = tree.walk().filter(|&id| tree.node(id).is_directory()).count();
        if directories != self.entries.len() {
            return mismatch(offset, "directory count differs from the directory hierarchy");
        }
        Ok(())
    }

    /// Read the table of `kind` described by `volume`
    pub fn read<S: SectorStore + ?Sized>(
        store: &mut S,
        volume: &VolumeInfo,
        kind: PathTableType,
    ) -> Result<Self> {
        let lba = match kind {
            PathTableType::LittleEndian => volume.type_l_path_table,
            PathTableType::BigEndian => volume.type_m_path_table,
        };
        let size = volume.path_table_size as usize;
        let sectors = sectors_for_bytes(size as u64) as usize;
        let data = store.read(lba as u64, sectors)?;
        Self::parse(&data[..size], kind, lba as u64 * 2048)
    }

    /// Read both tables and require identical content
    ///
    /// With `verify` off only the type L table is read.
    pub fn read_verified<S: SectorStore + ?Sized>(
        store: &mut S,
        volume: &VolumeInfo,
        verify: bool,
    ) -> Result<Self> {
        let table = Self::read(store, volume, PathTableType::LittleEndian)?;
        if verify {
            let other = Self::read(store, volume, PathTableType::BigEndian)?;
            if other != table {
                return Err(Iso9660Error::format(
                    Structure::PathTable,
                    volume.type_m_path_table as u64 * 2048,
                    "type L and type M tables differ",
                ));
            }
        }
        if !table.is_canonically_ordered() {
            log::warn!("path table entries are not in (parent, identifier) order");
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn sample() -> PathTable {
        PathTable::from_entries(vec![
            PathTableEntry {
                extended_attr_length: 0,
                extent_lba: 20,
                parent: 1,
                identifier: vec![0],
            },
            PathTableEntry {
                extended_attr_length: 0,
                extent_lba: 21,
                parent: 1,
                identifier: b"BOOT".to_vec(),
            },
            PathTableEntry {
                extended_attr_length: 0,
                extent_lba: 22,
                parent: 1,
                identifier: b"SUB".to_vec(),
            },
            PathTableEntry {
                extended_attr_length: 0,
                extent_lba: 23,
                parent: 3,
                identifier: b"DEEP".to_vec(),
            },
        ])
    }

    #[test]
    fn test_both_byte_orders() {
        let table = sample();
        let l = table.encode(PathTableType::LittleEndian);
        let m = table.encode(PathTableType::BigEndian);
        assert_eq!(l.len() as u32, table.size());
        assert_eq!(&l[2..6], &20u32.to_le_bytes());
        assert_eq!(&m[2..6], &20u32.to_be_bytes());
        assert_eq!(PathTable::parse(&l, PathTableType::LittleEndian, 0).unwrap(), table);
        assert_eq!(PathTable::parse(&m, PathTableType::BigEndian, 0).unwrap(), table);
    }

    #[test]
    fn test_root_entry_padding() {
        let table = sample();
        // Root: 8 + 1 identifier byte + 1 pad
        assert_eq!(table.entries()[0].encoded_len(), 10);
        // "SUB": odd length gets a pad byte
        assert_eq!(table.entries()[2].encoded_len(), 12);
        assert_eq!(table.entries()[1].encoded_len(), 12);
    }

    #[test]
    fn test_canonical_order() {
        let mut table = sample();
        assert!(table.is_canonically_ordered());
        table.entries.swap(1, 2);
        assert!(!table.is_canonically_ordered());
    }

    #[test]
    fn test_path_resolution() {
        let table = sample();
        assert_eq!(table.path(1).unwrap(), "/");
        assert_eq!(table.path(4).unwrap(), "/SUB/DEEP");
        assert_eq!(table.find("/sub/deep"), Some(4));
        assert_eq!(table.find("/MISSING"), None);
    }

    #[test]
    fn test_zero_length_identifier() {
        let mut bytes = sample().encode(PathTableType::LittleEndian);
        bytes[10] = 0;
        assert!(matches!(
            PathTable::parse(&bytes, PathTableType::LittleEndian, 4096),
            Err(Iso9660Error::Format {
                structure: Structure::PathTable,
                offset: 4106,
                ..
            })
        ));
    }

    #[test]
    fn test_directory_numbers_are_16_bit() {
        let tree = DirectoryTree::new();
        let root = tree.root();
        let fits = alloc::vec![root; u16::MAX as usize];
        assert_eq!(PathTable::build(&tree, &fits, |_| 20).unwrap().entries().len(), 65535);

        let too_many = alloc::vec![root; u16::MAX as usize + 1];
        assert_eq!(
            PathTable::build(&tree, &too_many, |_| 20),
            Err(Iso9660Error::TooManyDirectories(65536))
        );
    }
}
