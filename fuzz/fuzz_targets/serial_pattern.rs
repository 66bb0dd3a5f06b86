#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 256 {
        return;
    }
    if let Ok(pattern) = std::str::from_utf8(data) {
        let _ = edgeload::fuzzing::sample_serial_pattern_input(pattern);
    }
});
