//! OAT files: the ELF image dex2oat writes next to an app.
//!
//! The OAT header sits at a fixed 4 KiB offset inside the ELF (the start of
//! the `.rodata` segment). All offsets stored in the header are relative to it.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, trace};
use odex_patcher_dex::DexHeader;
use winnow::binary::le_u32;
use winnow::combinator::repeat;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;

use crate::Result;
use crate::checksum::{Checksum, ChecksumRecord};
use crate::container::{Container, fmt_container};
use crate::cursor::Cursor;
use crate::errors::ArtError;
use crate::header::{ContainerKind, HeaderInfo};
use crate::layout::{OatLayout, RecordStride, TableOffset, oat_layout, version_tag};

pub const ELF_MAGIC: &[u8; 4] = b"\x7fELF";
pub const OAT_MAGIC: &[u8; 4] = b"oat\n";

/// Absolute position of the OAT header inside the ELF image
pub const OAT_HEADER_OFFSET: u64 = 0x1000;

pub struct OatFile {
    path: PathBuf,
    layout: &'static OatLayout,
    header: HeaderInfo,
    records: Vec<ChecksumRecord>,
}

impl OatFile {
    pub fn open(path: impl AsRef<Path>) -> Result<OatFile> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        OatFile::from_bytes(path, &data)
    }

    pub(crate) fn from_bytes(path: &Path, data: &[u8]) -> Result<OatFile> {
        let (layout, header, records) = parse(data)?;
        debug!(
            "opened {:?}: {} with {} checksum records",
            path,
            header,
            records.len()
        );

        Ok(OatFile {
            path: path.to_path_buf(),
            layout,
            header,
            records,
        })
    }

    pub fn layout(&self) -> &'static OatLayout {
        self.layout
    }
}

impl Container for OatFile {
    fn kind(&self) -> ContainerKind {
        ContainerKind::Oat
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn header(&self) -> &HeaderInfo {
        &self.header
    }

    fn records(&self) -> &[ChecksumRecord] {
        &self.records
    }
}

impl fmt::Display for OatFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_container(self, f)
    }
}

/// Decode an OAT image held in memory
pub fn parse(data: &[u8]) -> Result<(&'static OatLayout, HeaderInfo, Vec<ChecksumRecord>)> {
    let cursor = Cursor::new(data);

    let elf = cursor.read_array::<4>(0)?;
    if &elf != ELF_MAGIC {
        return Err(ArtError::InvalidMagic {
            expected: ELF_MAGIC.to_vec(),
            actual: elf.to_vec(),
        });
    }

    let magic = cursor.read_array::<4>(OAT_HEADER_OFFSET)?;
    if &magic != OAT_MAGIC {
        return Err(ArtError::InvalidMagic {
            expected: OAT_MAGIC.to_vec(),
            actual: magic.to_vec(),
        });
    }

    let version = version_tag(&cursor.read_array::<4>(OAT_HEADER_OFFSET + 4)?);
    let layout = oat_layout(&version)?;
    let header = decode_header(&cursor, layout)?;
    let records = walk_records(&cursor, layout, &header)?;

    Ok((layout, header, records))
}

/// Every u32 word of the fixed header, the magic and version included
fn header_words(cursor: &Cursor, layout: &OatLayout) -> Result<Vec<u32>> {
    let length = u64::from(layout.header_words) * 4;
    let input = &mut cursor.read_bytes(OAT_HEADER_OFFSET, length)?;

    repeat(layout.header_words as usize, le_u32)
        .parse_next(input)
        .map_err(|_: ErrMode<ContextError>| ArtError::TruncatedFile {
            offset: OAT_HEADER_OFFSET,
            length,
            file_size: cursor.len(),
        })
}

fn decode_header(cursor: &Cursor, layout: &'static OatLayout) -> Result<HeaderInfo> {
    let words = header_words(cursor, layout)?;
    let word = |index: u32| u64::from(words[index as usize]);

    let dex_file_count = words[layout.dex_count_word as usize];
    let header_size = u64::from(layout.header_words) * 4 + word(layout.header_words - 1);

    let checksum_table_offset = match layout.table_offset {
        TableOffset::AfterHeader => OAT_HEADER_OFFSET + header_size,
        TableOffset::Stored { word: index } => OAT_HEADER_OFFSET + word(index),
    };

    Ok(HeaderInfo {
        version: layout.version.to_owned(),
        release: layout.release,
        dex_file_count,
        checksum_table_offset,
        header_size,
    })
}

fn ensure_inside(cursor: &Cursor, offset: u64, length: u64) -> Result<()> {
    if cursor.contains(offset, length) {
        Ok(())
    } else {
        Err(ArtError::OffsetOutOfBounds {
            offset,
            file_size: cursor.len(),
        })
    }
}

/// Follow the `OatDexFile` records: `u32 location_size`, the location, then the checksum
fn walk_records(
    cursor: &Cursor,
    layout: &OatLayout,
    header: &HeaderInfo,
) -> Result<Vec<ChecksumRecord>> {
    let count = header.dex_file_count;
    let mut records = Vec::with_capacity(count.min(256) as usize);
    let mut position = header.checksum_table_offset;

    for index in 0..count {
        ensure_inside(cursor, position, 4)?;
        let location_size = u64::from(cursor.read_u32_le(position)?);

        let checksum_offset = position + 4 + location_size;
        ensure_inside(cursor, checksum_offset, 4)?;
        let checksum = Checksum::new(cursor.read_array(checksum_offset)?);

        if log::log_enabled!(log::Level::Trace) {
            let location = cursor.read_bytes(position + 4, location_size)?;
            trace!(
                "dex #{} {:?} checksum {} at {:#x}",
                index,
                String::from_utf8_lossy(location),
                checksum,
                checksum_offset
            );
        }

        records.push(ChecksumRecord {
            offset: checksum_offset,
            checksum,
        });

        if index + 1 < count {
            position = next_record(cursor, layout.stride, checksum_offset)?;
        }
    }

    Ok(records)
}

fn next_record(cursor: &Cursor, stride: RecordStride, checksum_offset: u64) -> Result<u64> {
    match stride {
        RecordStride::Words(words) => Ok(checksum_offset + u64::from(words) * 4),
        RecordStride::DexHeaderLookup => {
            let dex_offset_position = checksum_offset + 4;
            ensure_inside(cursor, dex_offset_position, 4)?;

            let dex_start = OAT_HEADER_OFFSET + u64::from(cursor.read_u32_le(dex_offset_position)?);
            ensure_inside(cursor, dex_start, DexHeader::SIZE as u64)?;

            let dex = DexHeader::from_bytes(cursor.tail(dex_start)?)?;
            trace!(
                "dex header at {:#x} has {} class defs",
                dex_start, dex.class_defs_size
            );

            Ok(checksum_offset + 8 + u64::from(dex.class_defs_size) * 4)
        }
    }
}
