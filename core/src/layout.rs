//! Registry of on-disk header layouts, one entry per supported container version.
//!
//! ART never had a single stable OAT/VDEX header: each release reshuffles the
//! fields. A layout is a handful of plain parameters that the shared decoders
//! in [`crate::oat`] and [`crate::vdex`] interpret, so supporting another
//! release is a new table row.

use phf::phf_map;

use crate::errors::ArtError;
use crate::header::ContainerKind;

/// Where the first OAT checksum record starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOffset {
    /// Right after the header and its key-value store
    AfterHeader,

    /// Header word holding `oat_dex_files_offset`, relative to the OAT header
    Stored { word: u32 },
}

/// How to get from one OAT checksum to the next record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStride {
    /// `checksum + 8 + class_defs_size * 4`, `class_defs_size` comes from the
    /// dex header referenced by the u32 following the checksum
    DexHeaderLookup,

    /// Fixed number of u32 words counted from the checksum
    Words(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OatLayout {
    pub version: &'static str,
    pub release: &'static str,

    /// Number of u32 words in the fixed header, the last one is the key-value store size
    pub header_words: u32,

    /// Word index of `dex_file_count`
    pub dex_count_word: u32,

    pub table_offset: TableOffset,
    pub stride: RecordStride,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VdexLayoutKind {
    /// Dex count and checksum table at fixed byte offsets
    Fixed {
        dex_count_offset: u64,
        table_offset: u64,
    },

    /// Android 12 section table, the checksum section comes first
    Sectioned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VdexLayout {
    pub version: &'static str,
    pub release: &'static str,
    pub kind: VdexLayoutKind,
}

/// See `runtime/oat.h` and `oat_writer.cc` for each release tag
static OAT_LAYOUTS: phf::Map<&'static str, OatLayout> = phf_map! {
    // android-4.4_r1
    "007" => OatLayout {
        version: "007",
        release: "4.4",
        header_words: 16,
        dex_count_word: 4,
        table_offset: TableOffset::AfterHeader,
        stride: RecordStride::DexHeaderLookup,
    },
    // android-4.4.3_r1
    "008" => OatLayout {
        version: "008",
        release: "4.4.3",
        header_words: 16,
        dex_count_word: 4,
        table_offset: TableOffset::AfterHeader,
        stride: RecordStride::DexHeaderLookup,
    },
    // android-5.0.0_r1
    "039" => OatLayout {
        version: "039",
        release: "5.0",
        header_words: 21,
        dex_count_word: 5,
        table_offset: TableOffset::AfterHeader,
        stride: RecordStride::DexHeaderLookup,
    },
    // android-5.1.0_r1
    "045" => OatLayout {
        version: "045",
        release: "5.1",
        header_words: 21,
        dex_count_word: 5,
        table_offset: TableOffset::AfterHeader,
        stride: RecordStride::DexHeaderLookup,
    },
    // android-6.0.0_r1
    "064" => OatLayout {
        version: "064",
        release: "6.0",
        header_words: 18,
        dex_count_word: 5,
        table_offset: TableOffset::AfterHeader,
        stride: RecordStride::DexHeaderLookup,
    },
    // android-7.0.0_r1, oat_writer.cc no longer writes methods offsets inline
    "079" => OatLayout {
        version: "079",
        release: "7.0",
        header_words: 18,
        dex_count_word: 5,
        table_offset: TableOffset::AfterHeader,
        stride: RecordStride::Words(4),
    },
    // android-7.1.1_r1
    "088" => OatLayout {
        version: "088",
        release: "7.1.1",
        header_words: 18,
        dex_count_word: 5,
        table_offset: TableOffset::AfterHeader,
        stride: RecordStride::Words(4),
    },
    // android-8.0.0_r1
    "124" => OatLayout {
        version: "124",
        release: "8.0",
        header_words: 18,
        dex_count_word: 5,
        table_offset: TableOffset::AfterHeader,
        stride: RecordStride::Words(4),
    },
    // android-8.1.0_r1, oat_dex_files_offset_ appears
    "131" => OatLayout {
        version: "131",
        release: "8.1",
        header_words: 19,
        dex_count_word: 5,
        table_offset: TableOffset::Stored { word: 6 },
        stride: RecordStride::Words(6),
    },
    // android-9.0.0_r1
    "138" => OatLayout {
        version: "138",
        release: "9",
        header_words: 19,
        dex_count_word: 5,
        table_offset: TableOffset::Stored { word: 6 },
        stride: RecordStride::Words(8),
    },
    // android-10.0.0_r1
    "170" => OatLayout {
        version: "170",
        release: "10",
        header_words: 14,
        dex_count_word: 5,
        table_offset: TableOffset::Stored { word: 6 },
        stride: RecordStride::Words(8),
    },
    // android-11.0.0_r1
    "183" => OatLayout {
        version: "183",
        release: "11",
        header_words: 15,
        dex_count_word: 5,
        table_offset: TableOffset::Stored { word: 6 },
        stride: RecordStride::Words(8),
    },
    // android-12.0.0_r1
    "195" => OatLayout {
        version: "195",
        release: "12",
        header_words: 16,
        dex_count_word: 5,
        table_offset: TableOffset::Stored { word: 6 },
        stride: RecordStride::Words(10),
    },
    // android-s-v2-preview-1
    "199" => OatLayout {
        version: "199",
        release: "12L preview",
        header_words: 16,
        dex_count_word: 5,
        table_offset: TableOffset::Stored { word: 6 },
        stride: RecordStride::Words(10),
    },
};

/// See `runtime/vdex_file.h` for each release tag
static VDEX_LAYOUTS: phf::Map<&'static str, VdexLayout> = phf_map! {
    // magic, version, number_of_dex_files, dex_size, verifier_deps_size, quickening_info_size
    "006" => VdexLayout {
        version: "006",
        release: "8.0",
        kind: VdexLayoutKind::Fixed { dex_count_offset: 8, table_offset: 24 },
    },
    "010" => VdexLayout {
        version: "010",
        release: "8.1",
        kind: VdexLayoutKind::Fixed { dex_count_offset: 8, table_offset: 24 },
    },
    // magic, verifier_deps_version, dex_section_version, number_of_dex_files, verifier_deps_size
    "019" => VdexLayout {
        version: "019",
        release: "9",
        kind: VdexLayoutKind::Fixed { dex_count_offset: 12, table_offset: 20 },
    },
    // adds bootclasspath_checksums_size and class_loader_context_size
    "021" => VdexLayout {
        version: "021",
        release: "10/11",
        kind: VdexLayoutKind::Fixed { dex_count_offset: 12, table_offset: 28 },
    },
    "027" => VdexLayout {
        version: "027",
        release: "12",
        kind: VdexLayoutKind::Sectioned,
    },
};

/// Decode the version field: three ascii digits followed by a nul
///
/// The literal first three bytes are kept so unsupported versions can be reported verbatim.
pub(crate) fn version_tag(raw: &[u8; 4]) -> String {
    String::from_utf8_lossy(&raw[..3]).into_owned()
}

pub fn oat_layout(version: &str) -> Result<&'static OatLayout, ArtError> {
    OAT_LAYOUTS
        .get(version)
        .ok_or_else(|| ArtError::UnknownVersion {
            kind: ContainerKind::Oat,
            version: version.to_owned(),
        })
}

pub fn vdex_layout(version: &str) -> Result<&'static VdexLayout, ArtError> {
    VDEX_LAYOUTS
        .get(version)
        .ok_or_else(|| ArtError::UnknownVersion {
            kind: ContainerKind::Vdex,
            version: version.to_owned(),
        })
}

/// Every supported OAT layout, oldest first
pub fn oat_layouts() -> Vec<&'static OatLayout> {
    let mut layouts: Vec<_> = OAT_LAYOUTS.values().collect();
    layouts.sort_by_key(|layout| layout.version);
    layouts
}

/// Every supported VDEX layout, oldest first
pub fn vdex_layouts() -> Vec<&'static VdexLayout> {
    let mut layouts: Vec<_> = VDEX_LAYOUTS.values().collect();
    layouts.sort_by_key(|layout| layout.version);
    layouts
}
