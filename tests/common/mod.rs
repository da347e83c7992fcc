//! Shared test fixtures: assemble small SxG databases in memory.
//!
//! The builder writes the real on-disk layout: 40-byte big-endian
//! header, NUL-separated pack block, both index arrays, the sorted
//! range table, then the region and city tables. Record layouts match
//! the pack formats below.

// Not every test binary uses every helper
#![allow(dead_code)]

/// Pack block used by every fixture database
pub const PACK: &[u8] =
    b"T:id/c2:iso\0S:id/b:name/M:country_seek\0M:region_seek/T:country_id/b:name/d:lat/d:lon\0";

/// `T:id/c2:iso`
pub fn country_rec(id: u8, iso: &str) -> Vec<u8> {
    let mut rec = vec![id];
    rec.extend_from_slice(iso.as_bytes());
    rec
}

/// `S:id/b:name/M:country_seek`
pub fn region_rec(id: u16, name: &str, country_seek: u32) -> Vec<u8> {
    let mut rec = Vec::new();
    rec.extend_from_slice(&id.to_le_bytes());
    rec.extend_from_slice(name.as_bytes());
    rec.push(0);
    rec.extend_from_slice(&country_seek.to_le_bytes()[..3]);
    rec
}

/// `M:region_seek/T:country_id/b:name/d:lat/d:lon`
pub fn city_rec(region_seek: u32, country_id: u8, name: &str, lat: f64, lon: f64) -> Vec<u8> {
    let mut rec = Vec::new();
    rec.extend_from_slice(&region_seek.to_le_bytes()[..3]);
    rec.push(country_id);
    rec.extend_from_slice(name.as_bytes());
    rec.push(0);
    rec.extend_from_slice(&lat.to_le_bytes());
    rec.extend_from_slice(&lon.to_le_bytes());
    rec
}

/// Database assembler. Ranges are `(first_octet, suffix24, record_id)`
/// and must already be sorted by octet then suffix.
pub struct DbBuilder {
    pub first_byte_count: u8,
    pub blocks_per_element: u16,
    pub ranges: Vec<(u8, u32, u32)>,
    pub regions: Vec<u8>,
    pub cities: Vec<u8>,
    pub countries_size: u32,
}

impl DbBuilder {
    pub fn build(&self) -> Vec<u8> {
        let id_size = 3usize;
        let range_count = self.ranges.len() as u32;

        // first_byte_index[k] = count of ranges with first octet <= k,
        // so octet o owns [fbi[o-1], fbi[o])
        let mut first_byte_index = vec![0u32; self.first_byte_count as usize];
        for (k, slot) in first_byte_index.iter_mut().enumerate() {
            *slot = self
                .ranges
                .iter()
                .filter(|&&(octet, _, _)| (octet as usize) <= k)
                .count() as u32;
        }

        // Sparse samples of the boundary suffixes, one per
        // blocks_per_element ranges
        let step = self.blocks_per_element as usize;
        let mut main_index: Vec<u32> = self
            .ranges
            .iter()
            .step_by(step.max(1))
            .map(|&(_, suffix, _)| suffix)
            .collect();
        if main_index.is_empty() {
            main_index.push(0);
        }

        let mut buf = Vec::new();
        buf.extend_from_slice(b"SxG");
        buf.push(22); // version
        buf.extend_from_slice(&1_700_000_000u32.to_be_bytes());
        buf.push(2); // db type
        buf.push(0); // charset
        buf.push(self.first_byte_count);
        buf.extend_from_slice(&(main_index.len() as u16).to_be_bytes());
        buf.extend_from_slice(&self.blocks_per_element.to_be_bytes());
        buf.extend_from_slice(&range_count.to_be_bytes());
        buf.push(id_size as u8);
        buf.extend_from_slice(&64u16.to_be_bytes()); // region max
        buf.extend_from_slice(&96u16.to_be_bytes()); // city max
        buf.extend_from_slice(&(self.regions.len() as u32).to_be_bytes());
        buf.extend_from_slice(&(self.cities.len() as u32).to_be_bytes());
        buf.extend_from_slice(&8u16.to_be_bytes()); // country max
        buf.extend_from_slice(&self.countries_size.to_be_bytes());
        buf.extend_from_slice(&(PACK.len() as u16).to_be_bytes());
        buf.extend_from_slice(PACK);

        for fbi in &first_byte_index {
            buf.extend_from_slice(&fbi.to_be_bytes());
        }
        for sample in &main_index {
            buf.extend_from_slice(&sample.to_be_bytes());
        }
        for &(_, suffix, id) in &self.ranges {
            buf.extend_from_slice(&suffix.to_be_bytes()[1..]);
            buf.extend_from_slice(&id.to_be_bytes()[1..]);
        }
        buf.extend_from_slice(&self.regions);
        buf.extend_from_slice(&self.cities);
        buf
    }
}

/// Record offsets of [`standard_db`]'s contents
pub struct StandardSeeks {
    pub us_country: u32,
    pub de_country: u32,
    pub austin: u32,
    pub munich: u32,
    pub orphan: u32,
}

/// The fixture most tests share: two countries, two regions, three
/// cities. Octet 8 carries three ranges (Austin, Munich, then a
/// country-only tail), octet 9 a city with a null region seek.
pub fn standard_db() -> (Vec<u8>, StandardSeeks) {
    let mut countries = vec![0u8]; // pad so no record sits at seek 0
    let us_country = countries.len() as u32;
    countries.extend_from_slice(&country_rec(7, "US"));
    let de_country = countries.len() as u32;
    countries.extend_from_slice(&country_rec(12, "DE"));
    let countries_size = countries.len() as u32;

    let mut regions = vec![0u8];
    let texas = regions.len() as u32;
    regions.extend_from_slice(&region_rec(44, "Texas", us_country));
    let bavaria = regions.len() as u32;
    regions.extend_from_slice(&region_rec(77, "Bavaria", de_country));

    let mut cities = countries;
    let austin = cities.len() as u32;
    cities.extend_from_slice(&city_rec(texas, 7, "Austin", 30.27, -97.74));
    let munich = cities.len() as u32;
    cities.extend_from_slice(&city_rec(bavaria, 12, "Munich", 48.14, 11.58));
    let orphan = cities.len() as u32;
    cities.extend_from_slice(&city_rec(0, 7, "Nowhere", 0.0, 0.0));

    let builder = DbBuilder {
        first_byte_count: 224,
        blocks_per_element: 16,
        ranges: vec![
            (8, 0x000000, austin),
            (8, 0x080000, munich),
            (8, 0x100000, us_country),
            (9, 0x000000, orphan),
        ],
        regions,
        cities,
        countries_size,
    };

    (
        builder.build(),
        StandardSeeks {
            us_country,
            de_country,
            austin,
            munich,
            orphan,
        },
    )
}
