//! Two-level range-table windowing.
//!
//! The first octet of the query selects a coarse window from the
//! first-byte index. Large windows are narrowed with the sparse main
//! index, which samples range-table boundaries every
//! `blocks_per_element` entries. The refined window keeps one sample of
//! slack on each side; the locator's linear tail scan absorbs any
//! sampling-convention difference, so the slack only costs a few extra
//! binary-search steps.

use crate::header::Catalog;

/// First octets defined to have no mapping: "this network" and the
/// loopback / private blocks the format reserves.
const RESERVED_OCTETS: [u8; 3] = [0, 10, 127];

/// Narrow the range table to the window that can own `addr`
///
/// Returns `None` for reserved first octets, octets beyond the coarse
/// index, and empty blocks. The window is a half-open pair of
/// range-table positions `(lo, hi)`.
pub fn partition(catalog: &Catalog, addr: u32) -> Option<(u32, u32)> {
    let first_octet = (addr >> 24) as u8;
    if RESERVED_OCTETS.contains(&first_octet) || first_octet >= catalog.first_byte_count {
        return None;
    }

    let octet = first_octet as usize;
    let lo = catalog.first_byte_index[octet - 1];
    let hi = catalog.first_byte_index[octet];
    if lo >= hi {
        return None;
    }

    if hi - lo > catalog.blocks_per_element as u32 {
        Some(refine(catalog, addr & 0x00FF_FFFF, lo, hi))
    } else {
        Some((lo, hi))
    }
}

/// Narrow a coarse window using the sparse main index
///
/// `query` is the address with its first octet masked to zero, the same
/// form the stored samples take (zero-extended 24-bit boundaries).
fn refine(catalog: &Catalog, query: u32, lo: u32, hi: u32) -> (u32, u32) {
    let step = catalog.blocks_per_element as u32;
    let samples = &catalog.main_index;

    // First sample strictly greater than the query; the owning range
    // sits within one step of position p * step.
    let p = samples.partition_point(|&s| s <= query) as u32;

    let refined_lo = p.saturating_sub(1) * step;
    let refined_hi = if p as usize >= samples.len() {
        catalog.range_count
    } else {
        ((p + 1) * step).min(catalog.range_count)
    };

    let clamped = (refined_lo.max(lo), refined_hi.min(hi));
    if clamped.0 >= clamped.1 {
        // Degenerate sample data; fall back to the coarse window
        return (lo, hi);
    }
    clamped
}
