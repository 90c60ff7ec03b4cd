//! File content sources for building images

use crate::error::{Iso9660Error, Result};
use alloc::vec::Vec;

/// Random-access bytes backing a file node
pub trait ByteSource {
    /// Total length in bytes
    fn len(&self) -> u64;

    /// Is the source empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill `buf` with the bytes at `offset`
    ///
    /// Asking for bytes past `len()` is an error.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;
}

fn slice_at(data: &[u8], offset: u64, buf: &mut [u8]) -> Result<()> {
    let start = usize::try_from(offset).map_err(|_| Iso9660Error::ExtentOutOfBounds)?;
    let src = data
        .get(start..start + buf.len())
        .ok_or(Iso9660Error::ExtentOutOfBounds)?;
    buf.copy_from_slice(src);
    Ok(())
}

impl ByteSource for Vec<u8> {
    fn len(&self) -> u64 {
        self.as_slice().len() as u64
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        slice_at(self, offset, buf)
    }
}

impl ByteSource for &'static [u8] {
    fn len(&self) -> u64 {
        <[u8]>::len(self) as u64
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        slice_at(self, offset, buf)
    }
}

/// File on the host filesystem, opened on every read
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct HostFile {
    path: std::path::PathBuf,
    len: u64,
}

#[cfg(feature = "std")]
impl HostFile {
    /// Stat `path` and remember its length
    pub fn open(path: impl Into<std::path::PathBuf>) -> Result<Self> {
        let path = path.into();
        let len = std::fs::metadata(&path).map_err(io_error)?.len();
        Ok(Self { path, len })
    }
}

#[cfg(feature = "std")]
pub(crate) fn io_error(e: std::io::Error) -> Iso9660Error {
    Iso9660Error::Io {
        lba: None,
        message: alloc::format!("{}", e),
    }
}

#[cfg(feature = "std")]
impl ByteSource for HostFile {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        use std::io::{Read, Seek, SeekFrom};

        if offset + buf.len() as u64 > self.len {
            return Err(Iso9660Error::ExtentOutOfBounds);
        }
        let mut file = std::fs::File::open(&self.path).map_err(io_error)?;
        file.seek(SeekFrom::Start(offset)).map_err(io_error)?;
        file.read_exact(buf).map_err(io_error)
    }
}
