#![no_main]
use libfuzzer_sys::fuzz_target;
use sxgeo::PackFormat;

fuzz_target!(|data: &[u8]| {
    // First line is a descriptor string, the rest a record span
    let Some(nl) = data.iter().position(|&b| b == b'\n') else {
        return;
    };
    let Ok(descriptor) = std::str::from_utf8(&data[..nl]) else {
        return;
    };
    if let Ok(format) = PackFormat::parse(descriptor) {
        let _ = format.unpack(&data[nl + 1..]);
    }
});
