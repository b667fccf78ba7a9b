//! Synthetic containers and archives for unit tests.

use odex_patcher_dex::ENDIAN_CONSTANT;

/// Fake key-value store appended to every OAT header
pub(crate) const KEY_VALUE_STORE: &[u8] = b"dex2oat-cmdline\0--fake\0pic\0false\0";

/// Padding between the header and a checksum table whose offset is stored in the header
pub(crate) const STORED_TABLE_GAP: u64 = 12;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Stride {
    DexHeaderLookup,
    Words(u32),
}

/// Independent description of an OAT header layout, written out by hand in tests
#[derive(Debug, Clone, Copy)]
pub(crate) struct OatSpec {
    pub version: &'static str,
    pub header_words: u32,
    pub dex_count_word: u32,
    pub stored_offset_word: Option<u32>,
    pub stride: Stride,
}

impl OatSpec {
    pub(crate) fn new(
        version: &'static str,
        header_words: u32,
        dex_count_word: u32,
        stored_offset_word: Option<u32>,
        stride: Stride,
    ) -> OatSpec {
        OatSpec {
            version,
            header_words,
            dex_count_word,
            stored_offset_word,
            stride,
        }
    }
}

fn version_bytes(version: &str) -> [u8; 4] {
    let mut out = [0u8; 4];
    out[..3].copy_from_slice(&version.as_bytes()[..3]);
    out
}

fn class_defs_for(index: usize) -> u32 {
    index as u32 * 3 + 2
}

fn dex_header(class_defs_size: u32) -> Vec<u8> {
    let mut data = vec![0u8; 0x70];
    data[..8].copy_from_slice(b"dex\n035\0");
    data[32..36].copy_from_slice(&0x70u32.to_le_bytes());
    data[36..40].copy_from_slice(&0x70u32.to_le_bytes());
    data[40..44].copy_from_slice(&ENDIAN_CONSTANT.to_le_bytes());
    data[96..100].copy_from_slice(&class_defs_size.to_le_bytes());
    data
}

/// Build an ELF-wrapped OAT image, returns it with the absolute offset of every checksum
pub(crate) fn build_oat(spec: &OatSpec, dex: &[(&str, [u8; 4])]) -> (Vec<u8>, Vec<u64>) {
    let base = 0x1000usize;
    let mut image = vec![0u8; base];
    image[..4].copy_from_slice(b"\x7fELF");

    let mut header = vec![0u32; spec.header_words as usize];
    header[0] = u32::from_le_bytes(*b"oat\n");
    header[1] = u32::from_le_bytes(version_bytes(spec.version));
    header[spec.dex_count_word as usize] = dex.len() as u32;
    header[spec.header_words as usize - 1] = KEY_VALUE_STORE.len() as u32;

    let header_size = spec.header_words as usize * 4 + KEY_VALUE_STORE.len();
    let table = match spec.stored_offset_word {
        None => header_size,
        Some(word) => {
            let table = header_size + STORED_TABLE_GAP as usize;
            header[word as usize] = table as u32;
            table
        }
    };

    for word in &header {
        image.extend_from_slice(&word.to_le_bytes());
    }
    image.extend_from_slice(KEY_VALUE_STORE);
    image.resize(base + table, 0xee);

    // dex headers go after the last record
    let records_size: usize = dex
        .iter()
        .enumerate()
        .map(|(index, (location, _))| {
            let stride = match spec.stride {
                Stride::Words(words) => words as usize * 4,
                Stride::DexHeaderLookup => 8 + class_defs_for(index) as usize * 4,
            };
            4 + location.len() + stride
        })
        .sum();
    let dex_area = (image.len() + records_size).next_multiple_of(4);

    let mut offsets = Vec::with_capacity(dex.len());
    for (index, (location, checksum)) in dex.iter().enumerate() {
        let dex_offset = (dex_area + index * 0x70 - base) as u32;

        image.extend_from_slice(&(location.len() as u32).to_le_bytes());
        image.extend_from_slice(location.as_bytes());
        offsets.push(image.len() as u64);
        image.extend_from_slice(checksum);
        image.extend_from_slice(&dex_offset.to_le_bytes());

        let filler = match spec.stride {
            Stride::Words(words) => words as usize * 4 - 8,
            Stride::DexHeaderLookup => class_defs_for(index) as usize * 4,
        };
        image.extend(std::iter::repeat_n(0x5a, filler));
    }

    image.resize(dex_area, 0);
    for index in 0..dex.len() {
        image.extend_from_slice(&dex_header(class_defs_for(index)));
    }

    (image, offsets)
}

/// VDEX with the dex count and checksum table at fixed offsets
pub(crate) fn build_vdex_fixed(
    version: &str,
    dex_count_offset: u64,
    table_offset: u64,
    checksums: &[[u8; 4]],
) -> Vec<u8> {
    let mut image = vec![0u8; table_offset as usize];
    image[..4].copy_from_slice(b"vdex");
    image[4..8].copy_from_slice(&version_bytes(version));

    let count = dex_count_offset as usize;
    image[count..count + 4].copy_from_slice(&(checksums.len() as u32).to_le_bytes());

    for checksum in checksums {
        image.extend_from_slice(checksum);
    }
    image
}

/// Android 12 VDEX with `sections` section headers, the first one describing the checksums
pub(crate) fn build_vdex_sectioned(sections: u32, checksums: &[[u8; 4]]) -> Vec<u8> {
    let mut image = Vec::new();
    image.extend_from_slice(b"vdex");
    image.extend_from_slice(&version_bytes("027"));
    image.extend_from_slice(&sections.to_le_bytes());

    let table = 12 + sections * 12;
    let checksums_size = checksums.len() as u32 * 4;
    for kind in 0..sections {
        let (offset, size) = if kind == 0 {
            (table, checksums_size)
        } else {
            (table + checksums_size, 0)
        };
        image.extend_from_slice(&kind.to_le_bytes());
        image.extend_from_slice(&offset.to_le_bytes());
        image.extend_from_slice(&size.to_le_bytes());
    }

    for checksum in checksums {
        image.extend_from_slice(checksum);
    }
    image
}

/// Minimal stored zip archive, the central directory carries the real CRC32 of every file
pub(crate) fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut central = Vec::new();

    for (name, data) in files {
        let crc = crc32fast::hash(data);
        let offset = out.len() as u32;
        let size = (data.len() as u32).to_le_bytes();

        out.extend_from_slice(b"PK\x03\x04");
        // version, flags, method, time, date
        out.extend_from_slice(&[20, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&size);
        out.extend_from_slice(&size);
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(data);

        central.extend_from_slice(b"PK\x01\x02");
        // made by, needed, flags, method, time, date
        central.extend_from_slice(&[20, 0, 20, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        central.extend_from_slice(&crc.to_le_bytes());
        central.extend_from_slice(&size);
        central.extend_from_slice(&size);
        central.extend_from_slice(&(name.len() as u16).to_le_bytes());
        central.extend_from_slice(&[0; 12]); // extra, comment, disk, attributes
        central.extend_from_slice(&offset.to_le_bytes());
        central.extend_from_slice(name.as_bytes());
    }

    let central_offset = out.len() as u32;
    out.extend_from_slice(&central);

    out.extend_from_slice(b"PK\x05\x06");
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&(files.len() as u16).to_le_bytes());
    out.extend_from_slice(&(files.len() as u16).to_le_bytes());
    out.extend_from_slice(&(central.len() as u32).to_le_bytes());
    out.extend_from_slice(&central_offset.to_le_bytes());
    out.extend_from_slice(&[0, 0]);
    out
}
