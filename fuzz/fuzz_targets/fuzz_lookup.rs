#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First half is interpreted as a database, the rest as a query.
    // Neither opening nor querying may ever panic.
    let split = data.len() / 2;
    if let Ok(db) = sxgeo::Database::from_bytes(data[..split].to_vec()) {
        if let Ok(query) = std::str::from_utf8(&data[split..]) {
            let _ = db.lookup(query);
        }
        // Exercise the typed path on a few fixed addresses too
        for addr in ["8.8.8.8", "1.0.0.1", "223.255.255.255"] {
            let _ = db.lookup_ip(addr.parse().unwrap());
        }
    }
});
