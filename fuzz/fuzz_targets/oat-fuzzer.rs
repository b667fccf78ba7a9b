#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // must reach the oat header
    if data.len() < 0x1008 {
        return;
    }

    let _ = odex_patcher::oat::parse(data);
});
