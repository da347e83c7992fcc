//! Database handle and lookup facade.
//!
//! Ties the pieces together: parse the query IP, locate the owning range,
//! unpack the record, then chase the back-references that link a city to
//! its region and a region to its country. The caller gets a nested
//! [`LookupResult`]; branches the database has no data for are simply
//! absent.
//!
//! # Examples
//!
//! ```no_run
//! use sxgeo::Database;
//!
//! let db = Database::open("SxGeoCity.dat")?;
//!
//! if let Some(result) = db.lookup("8.8.8.8")? {
//!     if let Some(city) = &result.city {
//!         println!("city: {:?}", city.get("name_en"));
//!     }
//! }
//! # Ok::<(), sxgeo::GeoError>(())
//! ```

use crate::error::{GeoError, Result};
use crate::header::Catalog;
use crate::locate;
use crate::store::ByteStore;
use crate::unpack::{GeoRecord, PackFormat};
use serde::Serialize;
use std::net::Ipv4Addr;
use std::path::Path;

/// City-record field pointing at the owning region record
const REGION_SEEK: &str = "region_seek";
/// Region-record field pointing at the owning country record
const COUNTRY_SEEK: &str = "country_seek";
/// City-record shortcut to the country id, redundant once the country
/// chain is resolved
const COUNTRY_ID: &str = "country_id";

/// Result of a successful lookup
///
/// Each branch is a decoded record map. A branch the database has no
/// data for is omitted, not present-as-null; serialization follows suit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResult {
    /// Country fields, when resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<GeoRecord>,
    /// Region fields, when the city carries a region reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<GeoRecord>,
    /// City fields, absent for country-only matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<GeoRecord>,
}

/// An open, read-only geolocation database
///
/// Opening loads and validates the whole file; afterwards the handle is
/// immutable and safe for unbounded concurrent lookups. To pick up a
/// replaced database file, open a new handle and swap it in; lookups in
/// flight against the old handle stay valid.
#[derive(Debug)]
pub struct Database {
    store: ByteStore,
    catalog: Catalog,
}

impl Database {
    /// Open a database file using memory mapping
    ///
    /// Fails if the file cannot be read or its header, pack formats or
    /// index sections do not parse. No partial handle is ever returned.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let store = ByteStore::open(path)?;
        Self::from_store(store)
    }

    /// Create a database from raw bytes (for testing and fuzzing)
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_store(ByteStore::from_bytes(data))
    }

    fn from_store(store: ByteStore) -> Result<Self> {
        let catalog = Catalog::parse(&store)?;
        Ok(Self { store, catalog })
    }

    /// The parsed catalog: header metadata, sizing and table offsets
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Look up a dotted-decimal IPv4 address string
    ///
    /// Malformed strings are not an error: an address that cannot exist
    /// has no geo data, so this returns `Ok(None)` exactly as it does
    /// for reserved or unmapped addresses.
    pub fn lookup(&self, query: &str) -> Result<Option<LookupResult>> {
        match query.parse::<Ipv4Addr>() {
            Ok(addr) => self.lookup_ip(addr),
            Err(_) => Ok(None),
        }
    }

    /// Look up an already-parsed IPv4 address
    pub fn lookup_ip(&self, addr: Ipv4Addr) -> Result<Option<LookupResult>> {
        let seek = match locate::locate(&self.catalog, &self.store, u32::from(addr))? {
            Some(seek) => seek,
            None => return Ok(None),
        };

        if seek < self.catalog.countries_size {
            // Country-only match: the record sits in the country block
            // at the head of the cities table
            let country = self.read_country(seek)?;
            return Ok(Some(LookupResult {
                country: Some(country),
                region: None,
                city: None,
            }));
        }

        let mut city = self.read_record(
            self.catalog.cities_offset,
            seek,
            self.catalog.city_max as usize,
            self.catalog.cities_size,
            &self.catalog.city_format,
        )?;

        let mut region = None;
        let mut country = None;

        if let Some(region_seek) = take_seek(&mut city, REGION_SEEK) {
            let mut region_record = self.read_record(
                self.catalog.regions_offset,
                region_seek,
                self.catalog.region_max as usize,
                self.catalog.regions_size,
                &self.catalog.region_format,
            )?;
            if let Some(country_seek) = take_seek(&mut region_record, COUNTRY_SEEK) {
                country = Some(self.read_country(country_seek)?);
            }
            region = Some(region_record);
        }

        // Redundant once the chain above is resolved; zero means absent
        city.remove(COUNTRY_ID);

        Ok(Some(LookupResult {
            country,
            region,
            city: Some(city),
        }))
    }

    fn read_country(&self, seek: u32) -> Result<GeoRecord> {
        self.read_record(
            self.catalog.cities_offset,
            seek,
            self.catalog.country_max as usize,
            self.catalog.cities_size,
            &self.catalog.country_format,
        )
    }

    /// Unpack one record at `base + seek`, spanning at most `max` bytes
    /// and never past the table's extent
    fn read_record(
        &self,
        base: usize,
        seek: u32,
        max: usize,
        table_size: u32,
        format: &PackFormat,
    ) -> Result<GeoRecord> {
        let seek = seek as usize;
        let table_size = table_size as usize;
        if seek >= table_size {
            return Err(GeoError::OutOfRange {
                offset: base + seek,
                len: max,
                size: base + table_size,
            });
        }
        let span_len = max.min(table_size - seek);
        let span = self.store.read_at(base + seek, span_len)?;
        format.unpack(span)
    }
}

/// Strip a seek field from a record; zero is "absent", not offset 0
fn take_seek(record: &mut GeoRecord, key: &str) -> Option<u32> {
    record
        .remove(key)
        .and_then(|v| v.as_uint())
        .filter(|&seek| seek != 0)
        .map(|seek| seek as u32)
}
