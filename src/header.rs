//! SxG header parsing and the database catalog.
//!
//! An SxG file opens with a fixed 40-byte header, big-endian throughout:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  "SxG" signature (3)                        │
//! │  version (1)  build timestamp (4)           │
//! │  db type (1)  charset (1)                   │
//! │  first-byte index count (1)                 │
//! │  main index count (2)  blocks/element (2)   │
//! │  range count (4)  id size (1)               │
//! │  region max (2)  city max (2)               │
//! │  regions size (4)  cities size (4)          │
//! │  country max (2)  countries size (4)        │
//! │  pack block size (2)                        │
//! ├─────────────────────────────────────────────┤
//! │  pack block: three NUL-separated            │
//! │  descriptor strings (country/region/city)   │
//! ├─────────────────────────────────────────────┤
//! │  first-byte index (count × u32)             │
//! │  main index (count × u32)                   │
//! ├─────────────────────────────────────────────┤
//! │  range table (count × (3 + id size))        │
//! │  regions table                              │
//! │  cities table (country records at its head) │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Parsing happens once at open. The resulting [`Catalog`] is immutable and
//! holds everything a lookup needs: sizing, derived table offsets, the two
//! index arrays, and the three parsed pack formats.

use crate::error::{GeoError, Result};
use crate::store::ByteStore;
use crate::unpack::PackFormat;
use zerocopy::byteorder::big_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

/// Signature bytes at offset 0
pub const SIGNATURE: &[u8; 3] = b"SxG";

/// Size of the fixed header in bytes
pub const HEADER_SIZE: usize = 40;

/// Fixed-layout file header (40 bytes, big-endian, unaligned)
///
/// Field widths must match the on-disk format exactly; the static
/// assertion below pins the struct size.
#[derive(FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct RawHeader {
    signature: [u8; 3],
    version: u8,
    build_timestamp: U32,
    db_type: u8,
    charset: u8,
    first_byte_count: u8,
    main_index_count: U16,
    blocks_per_element: U16,
    range_count: U32,
    id_size: u8,
    region_max: U16,
    city_max: U16,
    regions_size: U32,
    cities_size: U32,
    country_max: U16,
    countries_size: U32,
    pack_size: U16,
}

const _: () = {
    assert!(std::mem::size_of::<RawHeader>() == HEADER_SIZE);
};

/// Everything a lookup needs to navigate one open database
///
/// Built once by [`Catalog::parse`]; never mutated afterwards. Shared by
/// reference into the stateless index, locate and unpack functions.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Format version byte (informational)
    pub version: u8,
    /// Unix timestamp the database was built at (informational)
    pub build_timestamp: u32,
    /// Database type byte (informational)
    pub db_type: u8,
    /// Charset byte (informational; field strings are decoded as UTF-8)
    pub charset: u8,

    /// Entries in the coarse first-octet index
    pub first_byte_count: u8,
    /// Entries in the sparse main index
    pub main_index_count: u16,
    /// Ranges covered by one main-index element
    pub blocks_per_element: u16,
    /// Records in the range table
    pub range_count: u32,
    /// Width in bytes (1-3) of a record id in the range table
    pub id_size: u8,

    /// Per-record max byte span of the region table
    pub region_max: u16,
    /// Per-record max byte span of the city table
    pub city_max: u16,
    /// Per-record max byte span of country records
    pub country_max: u16,
    /// Total byte extent of the regions table
    pub regions_size: u32,
    /// Total byte extent of the cities table
    pub cities_size: u32,
    /// Byte extent of the country records at the head of the cities table
    pub countries_size: u32,

    /// Absolute file offset of the range table
    pub ranges_offset: usize,
    /// Absolute file offset of the regions table
    pub regions_offset: usize,
    /// Absolute file offset of the cities table (and of country records)
    pub cities_offset: usize,

    /// Coarse index: one range-table position per first octet
    pub first_byte_index: Vec<u32>,
    /// Sparse index: zero-extended 24-bit boundaries sampled every
    /// `blocks_per_element` ranges
    pub main_index: Vec<u32>,

    /// Parsed country record format
    pub country_format: PackFormat,
    /// Parsed region record format
    pub region_format: PackFormat,
    /// Parsed city record format
    pub city_format: PackFormat,
}

impl Catalog {
    /// Parse the header, pack block and index arrays of an open store
    ///
    /// Any failure here is fatal to the open: a handle is never built
    /// from a partially parsed file.
    pub fn parse(store: &ByteStore) -> Result<Self> {
        let buf = store.as_slice();

        match buf.get(..SIGNATURE.len()) {
            Some(sig) if sig == SIGNATURE => {}
            _ => return Err(GeoError::BadSignature),
        }

        let (raw, _) = RawHeader::ref_from_prefix(buf).map_err(|_| GeoError::Truncated {
            what: "header",
            offset: 0,
        })?;

        let first_byte_count = raw.first_byte_count;
        let main_index_count = raw.main_index_count.get();
        let blocks_per_element = raw.blocks_per_element.get();
        let range_count = raw.range_count.get();
        let id_size = raw.id_size;

        if raw.build_timestamp.get() == 0
            || first_byte_count == 0
            || main_index_count == 0
            || blocks_per_element == 0
            || range_count == 0
        {
            return Err(GeoError::BadHeader("zero-valued sizing field".to_string()));
        }
        if !(1..=3).contains(&id_size) {
            return Err(GeoError::BadHeader(format!(
                "record id size {} outside 1-3",
                id_size
            )));
        }

        let mut cursor = HEADER_SIZE;

        let pack_size = raw.pack_size.get() as usize;
        let pack_block = read_section(store, &mut cursor, pack_size, "pack block")?;
        let (country_format, region_format, city_format) = parse_pack_block(pack_block)?;

        let first_byte_index = read_u32_array(
            store,
            &mut cursor,
            first_byte_count as usize,
            "first-byte index",
        )?;
        let main_index = read_u32_array(store, &mut cursor, main_index_count as usize, "main index")?;

        let ranges_offset = cursor;
        let range_entry_size = 3 + id_size as usize;
        let regions_offset = ranges_offset + range_count as usize * range_entry_size;
        let cities_offset = regions_offset + raw.regions_size.get() as usize;
        let data_end = cities_offset + raw.cities_size.get() as usize;

        // Table extents must fit the file; a lookup never discovers
        // truncation the header could have revealed at open.
        if data_end > buf.len() {
            return Err(GeoError::Truncated {
                what: "data tables",
                offset: ranges_offset,
            });
        }

        Ok(Catalog {
            version: raw.version,
            build_timestamp: raw.build_timestamp.get(),
            db_type: raw.db_type,
            charset: raw.charset,
            first_byte_count,
            main_index_count,
            blocks_per_element,
            range_count,
            id_size,
            region_max: raw.region_max.get(),
            city_max: raw.city_max.get(),
            country_max: raw.country_max.get(),
            regions_size: raw.regions_size.get(),
            cities_size: raw.cities_size.get(),
            countries_size: raw.countries_size.get(),
            ranges_offset,
            regions_offset,
            cities_offset,
            first_byte_index,
            main_index,
            country_format,
            region_format,
            city_format,
        })
    }

    /// Width in bytes of one range-table entry
    pub fn range_entry_size(&self) -> usize {
        3 + self.id_size as usize
    }
}

fn read_section<'a>(
    store: &'a ByteStore,
    cursor: &mut usize,
    len: usize,
    what: &'static str,
) -> Result<&'a [u8]> {
    let offset = *cursor;
    let bytes = store.read_at(offset, len).map_err(|_| GeoError::Truncated {
        what,
        offset,
    })?;
    *cursor += len;
    Ok(bytes)
}

fn read_u32_array(
    store: &ByteStore,
    cursor: &mut usize,
    count: usize,
    what: &'static str,
) -> Result<Vec<u32>> {
    let bytes = read_section(store, cursor, count * 4, what)?;
    Ok(bytes
        .chunks_exact(4)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn parse_pack_block(block: &[u8]) -> Result<(PackFormat, PackFormat, PackFormat)> {
    let parts: Vec<&[u8]> = block.split(|&b| b == 0).collect();
    if parts.len() < 3 {
        return Err(GeoError::BadDescriptor(format!(
            "pack block holds {} descriptors, need 3",
            parts.len()
        )));
    }
    let as_str = |bytes: &[u8]| -> Result<String> {
        String::from_utf8(bytes.to_vec())
            .map_err(|_| GeoError::BadDescriptor("descriptor is not UTF-8".to_string()))
    };
    Ok((
        PackFormat::parse(&as_str(parts[0])?)?,
        PackFormat::parse(&as_str(parts[1])?)?,
        PackFormat::parse(&as_str(parts[2])?)?,
    ))
}
