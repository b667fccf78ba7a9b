#![no_main]

use libfuzzer_sys::fuzz_target;
use odex_patcher::DexChecksumMap;
use odex_patcher_zip::ZipEntry;

fuzz_target!(|data: &[u8]| {
    let _ = ZipEntry::new(data);
    let _ = DexChecksumMap::from_zip_bytes(data);
});
