//! Byte store for memory-mapped database files.
//!
//! The whole database file is mapped (or owned) as one contiguous immutable
//! buffer at open time. SxG files are tens of megabytes at most, so there is
//! no streaming path: every read after open is a bounds-checked slice of the
//! buffer.
//!
//! # Thread Safety
//!
//! The store is strictly read-only after construction. Any number of
//! concurrent lookups may read from it without synchronization.

use crate::error::{GeoError, Result};
use memmap2::Mmap;
use std::fmt;
use std::fs::File;
use std::path::Path;

/// Backing storage for database bytes - either owned or memory-mapped
enum Storage {
    Owned(Vec<u8>),
    Mmap(Mmap),
}

impl Storage {
    fn as_slice(&self) -> &[u8] {
        match self {
            Storage::Owned(v) => v.as_slice(),
            Storage::Mmap(m) => &m[..],
        }
    }
}

/// Immutable in-memory view of a database file
///
/// Created once at open; shared read-only by every lookup afterwards.
pub struct ByteStore {
    data: Storage,
}

impl ByteStore {
    /// Open a database file using memory mapping
    ///
    /// The map is read-only and stays valid for the lifetime of the store.
    /// No file descriptor state is consulted after this call.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| GeoError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|e| GeoError::Io(format!("Failed to mmap {}: {}", path.display(), e)))?;

        Ok(Self {
            data: Storage::Mmap(mmap),
        })
    }

    /// Create a store from raw bytes (for testing and fuzzing)
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            data: Storage::Owned(data),
        }
    }

    /// Total size of the loaded buffer in bytes
    pub fn len(&self) -> usize {
        self.data.as_slice().len()
    }

    /// True if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.as_slice().is_empty()
    }

    /// Get a slice of the entire buffer
    pub fn as_slice(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// Read exactly `len` bytes starting at `offset`
    ///
    /// Fails with [`GeoError::OutOfRange`] if the request exceeds the
    /// buffer. Reads are never silently clamped; a short read here means
    /// the file is corrupt or an offset computation is wrong.
    pub fn read_at(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let buf = self.data.as_slice();
        let end = offset.checked_add(len).ok_or(GeoError::OutOfRange {
            offset,
            len,
            size: buf.len(),
        })?;
        if end > buf.len() {
            return Err(GeoError::OutOfRange {
                offset,
                len,
                size: buf.len(),
            });
        }
        Ok(&buf[offset..end])
    }
}

impl fmt::Debug for ByteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStore")
            .field("len", &self.len())
            .field(
                "mapped",
                &matches!(self.data, Storage::Mmap(_)),
            )
            .finish()
    }
}
