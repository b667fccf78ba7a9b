use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// A dex checksum as its four on-disk bytes
///
/// ART stores the dex file's CRC32 as a little-endian `u32`, so a zip CRC of
/// `0xddccbbaa` is written to disk as `aa bb cc dd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checksum([u8; 4]);

impl Checksum {
    #[inline]
    pub const fn new(bytes: [u8; 4]) -> Checksum {
        Checksum(bytes)
    }

    /// Checksum as ART expects it for a dex entry with the given CRC32
    #[inline]
    pub const fn from_crc32(crc: u32) -> Checksum {
        Checksum(crc.to_le_bytes())
    }

    #[inline]
    pub const fn to_crc32(self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<[u8; 4]> for Checksum {
    fn from(bytes: [u8; 4]) -> Self {
        Checksum(bytes)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&const_hex::encode(self.0))
    }
}

/// Parses eight hex digits in on-disk byte order, an optional `0x` prefix is accepted
impl FromStr for Checksum {
    type Err = const_hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        let mut bytes = [0u8; 4];
        const_hex::decode_to_slice(s, &mut bytes)?;
        Ok(Checksum(bytes))
    }
}

impl Serialize for Checksum {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Location and original value of one dex checksum inside a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecksumRecord {
    /// Absolute file offset of the four checksum bytes
    pub offset: u64,

    /// Value found while parsing, kept even after the file is patched
    pub checksum: Checksum,
}
