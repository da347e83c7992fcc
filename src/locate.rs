//! Binary search over the sorted range table.
//!
//! Each range-table entry is `[boundary: 3 bytes BE][id: id_size bytes BE]`:
//! a 24-bit IP suffix where a range starts, followed by the offset of the
//! record owning that range. The query's first octet was already consumed
//! by the coarse index, so comparisons use the low 24 bits only.
//!
//! The search runs as a coarse binary search down to a handful of entries,
//! then a linear scan. The scan keeps the result exact regardless of how
//! ties were broken when the sparse index was generated.

use crate::error::Result;
use crate::header::Catalog;
use crate::index;
use crate::store::ByteStore;

/// Window size below which binary search hands over to a linear scan
const LINEAR_SCAN_THRESHOLD: u32 = 8;

/// Find the record offset owning `addr`
///
/// Returns `Ok(None)` when the address has no window (reserved or
/// out-of-catalog first octet, empty block) or resolves to the null
/// record id. Read failures against a corrupt table surface as errors.
pub fn locate(catalog: &Catalog, store: &ByteStore, addr: u32) -> Result<Option<u32>> {
    let (lo, hi) = match index::partition(catalog, addr) {
        Some(window) => window,
        None => return Ok(None),
    };

    let query = addr & 0x00FF_FFFF;
    let idx = search(catalog, store, query, lo, hi)?;

    let entry_size = catalog.range_entry_size();
    let id_offset = catalog.ranges_offset + idx as usize * entry_size + 3;
    let id_bytes = store.read_at(id_offset, catalog.id_size as usize)?;

    let mut id = 0u32;
    for &b in id_bytes {
        id = (id << 8) | b as u32;
    }
    if id == 0 {
        return Ok(None);
    }
    Ok(Some(id))
}

/// Largest index in `[lo, hi)` whose boundary is <= `query`, or `lo`
/// when the query sits below every boundary in the window
fn search(catalog: &Catalog, store: &ByteStore, query: u32, lo: u32, hi: u32) -> Result<u32> {
    let (mut lo, mut hi) = (lo, hi);

    while hi - lo > LINEAR_SCAN_THRESHOLD {
        let mid = (lo + hi) >> 1;
        if boundary(catalog, store, mid)? <= query {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let mut idx = lo;
    for i in lo..hi {
        if boundary(catalog, store, i)? <= query {
            idx = i;
        } else {
            break;
        }
    }
    Ok(idx)
}

/// Boundary of range `i`, zero-extended to 32 bits
fn boundary(catalog: &Catalog, store: &ByteStore, i: u32) -> Result<u32> {
    let offset = catalog.ranges_offset + i as usize * catalog.range_entry_size();
    let b = store.read_at(offset, 3)?;
    Ok(u32::from_be_bytes([0, b[0], b[1], b[2]]))
}
