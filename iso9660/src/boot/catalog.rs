//! Boot catalog parsing
//!
//! El Torito Boot Catalog structure and parsing.
//!
//! One catalog sector: validation entry, initial/default entry, then optional
//! sections (header followed by its entries). Extension entries (0x44) are
//! skipped when decoding and never produced.

use crate::boot::entry::{BootEntry, SectionHeader};
use crate::boot::validation::ValidationEntry;
use crate::error::{Iso9660Error, Result, Structure};
use crate::store::SectorStore;
use crate::types::{BootImage, BootPlatform, SECTOR_SIZE};
use alloc::vec;
use alloc::vec::Vec;

/// Section header with its entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSection {
    /// Header entry
    pub header: SectionHeader,

    /// Section entries
    pub entries: Vec<BootEntry>,
}

/// Boot Catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootCatalog {
    /// Validation entry
    pub validation: ValidationEntry,

    /// Initial/default boot entry
    pub default_entry: BootEntry,

    /// Additional sections
    pub sections: Vec<CatalogSection>,
}

fn entry_at(data: &[u8], pos: usize) -> Option<&[u8; 32]> {
    data.get(pos..pos + BootCatalog::ENTRY_SIZE)
        .and_then(|e| e.try_into().ok())
}

impl BootCatalog {
    /// Catalog entry size (32 bytes)
    pub const ENTRY_SIZE: usize = 32;

    /// Entries that fit in the single catalog sector
    pub const MAX_ENTRIES: usize = SECTOR_SIZE / Self::ENTRY_SIZE;

    /// Parse boot catalog from sector data at `lba`
    pub fn parse(data: &[u8], lba: u32) -> Result<Self> {
        let base = lba as u64 * SECTOR_SIZE as u64;
        let truncated = |pos: usize| {
            Iso9660Error::format(Structure::BootCatalog, base + pos as u64, "truncated catalog")
        };

        let validation = ValidationEntry::parse(entry_at(data, 0).ok_or(truncated(0))?, lba)?;
        let default_entry = BootEntry::parse(entry_at(data, 32).ok_or(truncated(32))?, base + 32)?;

        let mut sections = Vec::new();
        let mut pos = 64;
        while let Some(raw) = entry_at(data, pos) {
            if raw[0] == 0 {
                break;
            }
            if !SectionHeader::is_header(raw[0]) {
                return Err(Iso9660Error::format(
                    Structure::BootCatalog,
                    base + pos as u64,
                    "expected a section header",
                ));
            }

            let header = SectionHeader::parse(raw);
            pos += Self::ENTRY_SIZE;
            let mut entries = Vec::with_capacity(header.entry_count as usize);
            while entries.len() < header.entry_count as usize {
                let raw = entry_at(data, pos).ok_or(truncated(pos))?;
                if raw[0] != SectionHeader::EXTENSION {
                    entries.push(BootEntry::parse(raw, base + pos as u64)?);
                }
                pos += Self::ENTRY_SIZE;
            }
            // Extensions trailing the last entry
            while entry_at(data, pos).map_or(false, |raw| raw[0] == SectionHeader::EXTENSION) {
                pos += Self::ENTRY_SIZE;
            }

            let last = header.last;
            log::trace!(
                "boot catalog section {:?}: {} entries",
                header.platform,
                entries.len()
            );
            sections.push(CatalogSection { header, entries });
            if last {
                break;
            }
        }

        Ok(Self {
            validation,
            default_entry,
            sections,
        })
    }

    /// Read and parse the catalog sector at `lba`
    pub fn read<S: SectorStore + ?Sized>(store: &mut S, lba: u32) -> Result<Self> {
        let data = store.read(lba as u64, 1)?;
        Self::parse(&data, lba)
    }

    /// Catalog for `images`: the first becomes the default entry, the rest form
    /// sections, a new one starting whenever the platform changes
    ///
    /// Entries keep the order of `images`.
    pub fn from_images(id_string: &str, images: &[(BootPlatform, BootEntry)]) -> Result<Self> {
        let (first, rest) = images
            .split_first()
            .ok_or(Iso9660Error::InvalidBootImage("no boot images"))?;

        let mut sections: Vec<CatalogSection> = Vec::new();
        for (platform, entry) in rest {
            match sections.last_mut().filter(|s| s.header.platform == *platform) {
                Some(section) => section.entries.push(*entry),
                None => sections.push(CatalogSection {
                    header: SectionHeader {
                        last: false,
                        platform: *platform,
                        entry_count: 0,
                        id_string: Default::default(),
                    },
                    entries: vec![*entry],
                }),
            }
        }
        let count = sections.len();
        for (i, section) in sections.iter_mut().enumerate() {
            section.header.entry_count = section.entries.len() as u16;
            section.header.last = i + 1 == count;
        }

        let catalog = Self {
            validation: ValidationEntry::new(first.0, id_string),
            default_entry: first.1,
            sections,
        };
        if catalog.entry_count() > Self::MAX_ENTRIES {
            return Err(Iso9660Error::InvalidBootImage(
                "too many boot images for one catalog sector",
            ));
        }
        Ok(catalog)
    }

    /// Number of 32-byte entries, validation entry included
    pub fn entry_count(&self) -> usize {
        2 + self
            .sections
            .iter()
            .map(|s| 1 + s.entries.len())
            .sum::<usize>()
    }

    /// Encode as one zero-padded sector
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; SECTOR_SIZE];
        let mut put = |index: usize, bytes: &[u8; 32]| {
            let at = index * Self::ENTRY_SIZE;
            if let Some(slot) = out.get_mut(at..at + Self::ENTRY_SIZE) {
                slot.copy_from_slice(bytes);
            }
        };

        put(0, &self.validation.to_bytes());
        put(1, &self.default_entry.to_bytes());
        let mut index = 2;
        for section in &self.sections {
            put(index, &section.header.to_bytes());
            index += 1;
            for entry in &section.entries {
                put(index, &entry.to_bytes());
                index += 1;
            }
        }
        out
    }

    /// Every entry as a boot image, default entry first
    pub fn images(&self) -> Vec<BootImage> {
        let mut images = vec![self.default_entry.to_boot_image(self.validation.platform)];
        for section in &self.sections {
            images.extend(
                section
                    .entries
                    .iter()
                    .map(|e| e.to_boot_image(section.header.platform)),
            );
        }
        images
    }
}
