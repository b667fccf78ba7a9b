#![no_main]

use libfuzzer_sys::fuzz_target;
use odex_patcher_dex::DexHeader;

fuzz_target!(|data: &[u8]| {
    let _ = DexHeader::from_bytes(data);
});
