use log::trace;
use winnow::binary::{be_u16, be_u32, le_u32, u8};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take;

use crate::errors::DexError;

/// The constant is used to indicate the endiannes of the file in whic it is found.
///
/// This constant means - little-endian.
///
/// See: <https://source.android.com/docs/core/runtime/dex-format#endian-constant>
pub const ENDIAN_CONSTANT: u32 = 0x12345678;

/// The constant is used to indicate the endiannes of the file in whic it is found.
///
/// This constant means - big-endian.
///
/// See: <https://source.android.com/docs/core/runtime/dex-format#endian-constant>
pub const REVERSE_ENDIAN_CONSTANT: u32 = 0x78563412;

/// `dex\n` read as a big-endian integer
const DEX_MAGIC: u32 = 0x6465780A;

/// Known dex versions
///
/// See: <https://source.android.com/docs/core/runtime/dex-format#dex-file-magic>
#[derive(Default, Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum DexVersion {
    #[default]
    DEX35,
    DEX36,
    DEX37,
    DEX38,
    DEX39,
    DEX40,
    DEX41,
}

impl TryFrom<u16> for DexVersion {
    type Error = DexError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x3335 => Ok(DexVersion::DEX35),
            0x3336 => Ok(DexVersion::DEX36),
            0x3337 => Ok(DexVersion::DEX37),
            0x3338 => Ok(DexVersion::DEX38),
            0x3339 => Ok(DexVersion::DEX39),
            0x3430 => Ok(DexVersion::DEX40),
            0x3431 => Ok(DexVersion::DEX41),
            _ => Err(DexError::UnknownVersion(value)),
        }
    }
}

impl From<DexVersion> for u32 {
    fn from(value: DexVersion) -> Self {
        match value {
            DexVersion::DEX35 => 35,
            DexVersion::DEX36 => 36,
            DexVersion::DEX37 => 37,
            DexVersion::DEX38 => 38,
            DexVersion::DEX39 => 39,
            DexVersion::DEX40 => 40,
            DexVersion::DEX41 => 41,
        }
    }
}

/// Abstraction over dex header
///
/// See: <https://source.android.com/docs/core/runtime/dex-format#header-item>
#[derive(Default, Debug, Clone)]
pub struct DexHeader {
    /// Known dex version
    pub version: DexVersion,

    /// Adler32 checksum of the file
    ///
    /// Used to detect file corruption
    pub checksum: u32,

    /// SHA-1 signature of the file
    pub signature: [u8; 20],

    /// Size of the entire file (including the header) in bytes
    pub file_size: u32,

    /// Size of the header (this entire section) in bytes
    pub header_size: u32,

    /// Endiannes tag - [ENDIAN_CONSTANT] or [REVERSE_ENDIAN_CONSTANT]
    pub endian_tag: u32,

    pub link_size: u32,
    pub link_off: u32,
    pub map_off: u32,
    pub string_ids_size: u32,
    pub string_ids_off: u32,
    pub type_ids_size: u32,
    pub type_ids_off: u32,
    pub proto_ids_size: u32,
    pub proto_ids_off: u32,
    pub field_ids_size: u32,
    pub field_ids_off: u32,
    pub method_ids_size: u32,
    pub method_ids_off: u32,

    /// Count of elements in the class definitions list
    ///
    /// Pre-Nougat OAT images store one method-offsets word per class right
    /// after the dex file's checksum record, so this value drives the record stride.
    pub class_defs_size: u32,

    pub class_defs_off: u32,
    pub data_size: u32,
    pub data_off: u32,

    /// Unused in [DexVersion::DEX40] or earlier
    pub container_size: u32,

    /// Unused in [DexVersion::DEX40] or earlier
    pub header_offset: u32,
}

impl DexHeader {
    /// Size of the header up to and including `data_off`
    pub const SIZE: usize = 0x70;

    /// Byte offset of `class_defs_size` inside the header
    pub const CLASS_DEFS_SIZE_OFFSET: usize = 96;

    /// Decode the header at the start of `data`
    ///
    /// ```ignore
    /// let header = DexHeader::from_bytes(&data[dex_offset..])?;
    /// ```
    pub fn from_bytes(data: &[u8]) -> Result<DexHeader, DexError> {
        if data.len() < Self::SIZE {
            return Err(DexError::Truncated {
                size: data.len(),
                needed: Self::SIZE,
            });
        }

        let input = &mut &data[..];

        let version = Self::parse_magic(input).map_err(|_| DexError::InvalidHeader)?;
        let version = DexVersion::try_from(version)?;

        let mut header = Self::parse_fields(input).map_err(|_| DexError::InvalidHeader)?;
        header.version = version;

        if version >= DexVersion::DEX41 {
            (header.container_size, header.header_offset) = (le_u32, le_u32)
                .parse_next(input)
                .map_err(|_: ErrMode<ContextError>| DexError::Truncated {
                    size: data.len(),
                    needed: Self::SIZE + 8,
                })?;
        }

        trace!(
            "dex header: version={:?} file_size={} class_defs_size={}",
            header.version, header.file_size, header.class_defs_size
        );

        Ok(header)
    }

    /// `dex\n`, then three ascii digits and a nul, returns the two significant digits
    fn parse_magic(input: &mut &[u8]) -> ModalResult<u16> {
        let (_, _, version, _) = (
            be_u32.verify(|magic| *magic == DEX_MAGIC),
            u8.verify(|v| *v == 0x30),
            be_u16,
            u8.verify(|v| *v == 0x00),
        )
            .parse_next(input)?;

        Ok(version)
    }

    fn parse_fields(input: &mut &[u8]) -> ModalResult<DexHeader> {
        let (
            checksum,
            signature,
            file_size,
            header_size,
            endian_tag,
            link_size,
            link_off,
            map_off,
            string_ids_size,
            string_ids_off,
            type_ids_size,
            type_ids_off,
            proto_ids_size,
            proto_ids_off,
            field_ids_size,
            field_ids_off,
            method_ids_size,
            method_ids_off,
            class_defs_size,
            class_defs_off,
            data_size,
            data_off,
        ) = (
            le_u32, // checksum
            take(20usize).map(|bytes: &[u8]| {
                let mut signature = [0u8; 20];
                signature.copy_from_slice(bytes);
                signature
            }), // signature
            le_u32, // file_size
            le_u32, // header_size
            le_u32.verify(|&tag| tag == ENDIAN_CONSTANT || tag == REVERSE_ENDIAN_CONSTANT), // endian_tag
            le_u32, // link_size
            le_u32, // link_off
            le_u32, // map_off
            le_u32, // string_ids_size
            le_u32, // string_ids_off
            le_u32, // type_ids_size
            le_u32, // type_ids_off
            le_u32, // proto_ids_size
            le_u32, // proto_ids_off
            le_u32, // field_ids_size
            le_u32, // field_ids_off
            le_u32, // method_ids_size
            le_u32, // method_ids_off
            le_u32, // class_defs_size
            le_u32, // class_defs_off
            le_u32, // data_size
            le_u32, // data_off
        )
            .parse_next(input)?;

        Ok(DexHeader {
            version: DexVersion::default(),
            checksum,
            signature,
            file_size,
            header_size,
            endian_tag,
            link_size,
            link_off,
            map_off,
            string_ids_size,
            string_ids_off,
            type_ids_size,
            type_ids_off,
            proto_ids_size,
            proto_ids_off,
            field_ids_size,
            field_ids_off,
            method_ids_size,
            method_ids_off,
            class_defs_size,
            class_defs_off,
            data_size,
            data_off,
            container_size: 0,
            header_offset: 0,
        })
    }
}
