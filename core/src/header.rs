use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Oat,
    Vdex,
}

impl ContainerKind {
    pub fn name(&self) -> &'static str {
        match self {
            ContainerKind::Oat => "OAT",
            ContainerKind::Vdex => "VDEX",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical view of a container header, whatever the on-disk layout was
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderInfo {
    /// Three ascii digits, e.g. `"064"`
    pub version: String,

    /// Android release the layout belongs to
    pub release: &'static str,

    pub dex_file_count: u32,

    /// Absolute file offset of the first checksum record
    pub checksum_table_offset: u64,

    /// Size of the fixed header including its variable trailer
    pub header_size: u64,
}

impl fmt::Display for HeaderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version={} (Android {}), dex_file_count={}, checksum_table_offset={:#x}, header_size={:#x}",
            self.version,
            self.release,
            self.dex_file_count,
            self.checksum_table_offset,
            self.header_size
        )
    }
}
