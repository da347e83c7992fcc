use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use sxgeo::Database;

/// Assemble a synthetic database: `per_octet` ranges under every usable
/// first octet, rotating over a small set of city records.
fn build_db(per_octet: u32) -> Vec<u8> {
    const FIRST_BYTE_COUNT: u8 = 224;
    const STEP: u16 = 16;

    // Country block then a few city records
    let mut cities = vec![0u8];
    let country_seek = cities.len() as u32;
    cities.extend_from_slice(&[9, b'U', b'S']); // T:id/c2:iso
    let countries_size = cities.len() as u32;

    let mut regions = vec![0u8];
    let region_seek = regions.len() as u32;
    regions.extend_from_slice(&17u16.to_le_bytes());
    regions.extend_from_slice(b"Benchland\0");
    regions.extend_from_slice(&country_seek.to_le_bytes()[..3]);

    let mut city_seeks = Vec::new();
    for i in 0..32u32 {
        city_seeks.push(cities.len() as u32);
        cities.extend_from_slice(&region_seek.to_le_bytes()[..3]);
        cities.push(9);
        cities.extend_from_slice(format!("City {}\0", i).as_bytes());
    }

    // Evenly spaced boundaries per octet block
    let mut ranges = Vec::new();
    let spacing = (1u32 << 24) / per_octet;
    for octet in 1..FIRST_BYTE_COUNT {
        if matches!(octet, 10 | 127) {
            continue;
        }
        for i in 0..per_octet {
            let seek = city_seeks[(octet as usize + i as usize) % city_seeks.len()];
            ranges.push((octet, i * spacing, seek));
        }
    }

    let mut first_byte_index = vec![0u32; FIRST_BYTE_COUNT as usize];
    for (k, slot) in first_byte_index.iter_mut().enumerate() {
        *slot = ranges
            .iter()
            .filter(|&&(octet, _, _)| (octet as usize) <= k)
            .count() as u32;
    }
    let main_index: Vec<u32> = ranges
        .iter()
        .step_by(STEP as usize)
        .map(|&(_, suffix, _)| suffix)
        .collect();

    let pack: &[u8] = b"T:id/c2:iso\0S:id/b:name/M:country_seek\0M:region_seek/T:country_id/b:name\0";

    let mut buf = Vec::new();
    buf.extend_from_slice(b"SxG");
    buf.push(22);
    buf.extend_from_slice(&1_700_000_000u32.to_be_bytes());
    buf.push(2);
    buf.push(0);
    buf.push(FIRST_BYTE_COUNT);
    buf.extend_from_slice(&(main_index.len() as u16).to_be_bytes());
    buf.extend_from_slice(&STEP.to_be_bytes());
    buf.extend_from_slice(&(ranges.len() as u32).to_be_bytes());
    buf.push(3);
    buf.extend_from_slice(&64u16.to_be_bytes());
    buf.extend_from_slice(&64u16.to_be_bytes());
    buf.extend_from_slice(&(regions.len() as u32).to_be_bytes());
    buf.extend_from_slice(&(cities.len() as u32).to_be_bytes());
    buf.extend_from_slice(&8u16.to_be_bytes());
    buf.extend_from_slice(&countries_size.to_be_bytes());
    buf.extend_from_slice(&(pack.len() as u16).to_be_bytes());
    buf.extend_from_slice(pack);
    for fbi in &first_byte_index {
        buf.extend_from_slice(&fbi.to_be_bytes());
    }
    for sample in &main_index {
        buf.extend_from_slice(&sample.to_be_bytes());
    }
    for &(_, suffix, id) in &ranges {
        buf.extend_from_slice(&suffix.to_be_bytes()[1..]);
        buf.extend_from_slice(&id.to_be_bytes()[1..]);
    }
    buf.extend_from_slice(&regions);
    buf.extend_from_slice(&cities);
    buf
}

fn bench_lookups(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for per_octet in [64u32, 1024] {
        let db = Database::from_bytes(build_db(per_octet)).unwrap();

        let mut rng = StdRng::seed_from_u64(0x5847_6560);
        let queries: Vec<String> = (0..10_000)
            .map(|_| {
                format!(
                    "{}.{}.{}.{}",
                    rng.random_range(1..=223u8),
                    rng.random::<u8>(),
                    rng.random::<u8>(),
                    rng.random::<u8>()
                )
            })
            .collect();

        group.throughput(Throughput::Elements(queries.len() as u64));
        group.bench_function(format!("random_ips_{}_per_octet", per_octet), |b| {
            b.iter(|| {
                for q in &queries {
                    black_box(db.lookup(q).unwrap());
                }
            })
        });
    }

    group.finish();
}

fn bench_parse_overhead(c: &mut Criterion) {
    let db = Database::from_bytes(build_db(64)).unwrap();
    let addr: std::net::Ipv4Addr = "41.8.8.8".parse().unwrap();

    c.bench_function("lookup_parsed_ip", |b| {
        b.iter(|| black_box(db.lookup_ip(black_box(addr)).unwrap()))
    });
}

criterion_group!(benches, bench_lookups, bench_parse_overhead);
criterion_main!(benches);
