//! Sxgeo - Fast IPv4 Geolocation Lookups
//!
//! Sxgeo is a read-only reader for SxG binary geolocation databases. A
//! caller hands it a dotted-decimal IPv4 string and gets back nested
//! country / region / city records, or nothing for addresses the
//! database does not map.
//!
//! # Quick Start
//!
//! ```no_run
//! use sxgeo::Database;
//!
//! let db = Database::open("SxGeoCity.dat")?;
//!
//! if let Some(result) = db.lookup("8.8.8.8")? {
//!     if let Some(country) = &result.country {
//!         println!("country: {:?}", country.get("iso"));
//!     }
//!     if let Some(city) = &result.city {
//!         println!("city: {:?}", city.get("name_en"));
//!     }
//! }
//! # Ok::<(), sxgeo::GeoError>(())
//! ```
//!
//! # Key Features
//!
//! - **Zero-Copy Loading**: the file is memory-mapped once at open
//! - **Lock-Free Queries**: a handle is immutable and fully `Sync`;
//!   share it across as many threads as you like
//! - **Schema-Driven Records**: field layout comes from pack-format
//!   descriptors stored in the database itself
//! - **Fast Lookups**: two-level index plus binary search, O(log n)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │  Database File Format                │
//! ├──────────────────────────────────────┤
//! │  1. Header + pack formats            │
//! │  2. First-byte index (coarse)        │
//! │  3. Main index (sparse samples)      │
//! │  4. Range table (sorted boundaries)  │
//! │  5. Region / city record tables      │
//! └──────────────────────────────────────┘
//!          ↓ mmap() at open
//! ┌──────────────────────────────────────┐
//! │  lookup("8.8.8.8")                   │
//! │  octet → window → binary search      │
//! │  → record id → unpack → follow seeks │
//! └──────────────────────────────────────┘
//! ```
//!
//! Writing or updating databases is out of scope; the reader only ever
//! maps an existing file and answers point queries against it.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
/// Database handle and lookup facade
pub mod database;
/// Error types for open and lookup operations
pub mod error;
/// Header parsing and the database catalog
pub mod header;
/// Two-level range-table windowing
pub mod index;
/// Range-table binary search
pub mod locate;
/// Byte store for mapped database files
pub mod store;
/// Pack-format descriptors and record decoding
pub mod unpack;

// Re-exports for consumers

/// Open database handle and lookup results
pub use crate::database::{Database, LookupResult};

pub use crate::error::{GeoError, Result};
pub use crate::header::Catalog;
pub use crate::store::ByteStore;
pub use crate::unpack::{GeoRecord, PackFormat, Value};

// Version information
/// Library version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
