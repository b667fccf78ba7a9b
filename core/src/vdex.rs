//! VDEX files: the verification and dex side-car produced since Android 8.
//!
//! Unlike OAT, the dex checksums form one flat array of little-endian u32 values.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use winnow::binary::le_u32;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take;

use crate::Result;
use crate::checksum::{Checksum, ChecksumRecord};
use crate::container::{Container, fmt_container};
use crate::cursor::Cursor;
use crate::errors::ArtError;
use crate::header::{ContainerKind, HeaderInfo};
use crate::layout::{VdexLayout, VdexLayoutKind, vdex_layout, version_tag};

pub const VDEX_MAGIC: &[u8; 4] = b"vdex";

/// `magic`, `vdex_version`, `number_of_sections`
const SECTIONED_HEADER_SIZE: u64 = 12;

/// `section_kind`, `section_offset`, `section_size`
const SECTION_HEADER_SIZE: u64 = 12;

/// First entry of the section table, ART always puts the checksum section there
#[derive(Debug)]
struct SectionHeader {
    kind: u32,
    offset: u32,
    size: u32,
}

pub struct VdexFile {
    path: PathBuf,
    layout: &'static VdexLayout,
    header: HeaderInfo,
    records: Vec<ChecksumRecord>,
}

impl VdexFile {
    pub fn open(path: impl AsRef<Path>) -> Result<VdexFile> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        VdexFile::from_bytes(path, &data)
    }

    pub(crate) fn from_bytes(path: &Path, data: &[u8]) -> Result<VdexFile> {
        let (layout, header, records) = parse(data)?;
        debug!(
            "opened {:?}: {} with {} checksum records",
            path,
            header,
            records.len()
        );

        Ok(VdexFile {
            path: path.to_path_buf(),
            layout,
            header,
            records,
        })
    }

    pub fn layout(&self) -> &'static VdexLayout {
        self.layout
    }
}

impl Container for VdexFile {
    fn kind(&self) -> ContainerKind {
        ContainerKind::Vdex
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

impl fmt::Display for VdexFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_container(self, f)
    }
}

/// Decode a VDEX image held in memory
pub fn parse(data: &[u8]) -> Result<(&'static VdexLayout, HeaderInfo, Vec<ChecksumRecord>)> {
    let cursor = Cursor::new(data);

    let magic = cursor.read_array::<4>(0)?;
    if &magic != VDEX_MAGIC {
        return Err(ArtError::InvalidMagic {
            expected: VDEX_MAGIC.to_vec(),
            actual: magic.to_vec(),
        });
    }

    let version = version_tag(&cursor.read_array::<4>(4)?);
    let layout = vdex_layout(&version)?;
    let header = decode_header(&cursor, layout)?;

    let mut records = Vec::with_capacity(header.dex_file_count.min(256) as usize);
    for index in 0..u64::from(header.dex_file_count) {
        let offset = header.checksum_table_offset + index * 4;
        if !cursor.contains(offset, 4) {
            return Err(ArtError::OffsetOutOfBounds {
                offset,
                file_size: cursor.len(),
            });
        }

        records.push(ChecksumRecord {
            offset,
            checksum: Checksum::new(cursor.read_array(offset)?),
        });
    }

    Ok((layout, header, records))
}

fn decode_header(cursor: &Cursor, layout: &'static VdexLayout) -> Result<HeaderInfo> {
    let (dex_file_count, checksum_table_offset, header_size) = match layout.kind {
        VdexLayoutKind::Fixed {
            dex_count_offset,
            table_offset,
        } => (
            cursor.read_u32_le(dex_count_offset)?,
            table_offset,
            table_offset,
        ),

        VdexLayoutKind::Sectioned => {
            let (sections, section) = sectioned_header(cursor)?;

            let table_offset = SECTIONED_HEADER_SIZE + u64::from(sections) * SECTION_HEADER_SIZE;

            if section.kind != 0 {
                warn!(
                    "first vdex section has kind {}, expected the checksum section",
                    section.kind
                );
            }
            if u64::from(section.offset) != table_offset {
                warn!(
                    "checksum section claims offset {:#x} but follows the section table at {:#x}",
                    section.offset, table_offset
                );
            }
            if section.size % 4 != 0 {
                warn!(
                    "checksum section size {} is not a multiple of 4",
                    section.size
                );
            }

            (section.size / 4, table_offset, SECTIONED_HEADER_SIZE)
        }
    };

    Ok(HeaderInfo {
        version: layout.version.to_owned(),
        release: layout.release,
        dex_file_count,
        checksum_table_offset,
        header_size,
    })
}

/// `magic`, `vdex_version`, `number_of_sections`, then the first section header
fn sectioned_header(cursor: &Cursor) -> Result<(u32, SectionHeader)> {
    let length = SECTIONED_HEADER_SIZE + SECTION_HEADER_SIZE;
    let input = &mut cursor.read_bytes(0, length)?;

    let (_, _, sections, (kind, offset, size)) = (
        take(4usize),             // magic
        take(4usize),             // vdex_version
        le_u32,                   // number_of_sections
        (le_u32, le_u32, le_u32), // section_kind, section_offset, section_size
    )
        .parse_next(input)
        .map_err(|_: ErrMode<ContextError>| ArtError::TruncatedFile {
            offset: 0,
            length,
            file_size: cursor.len(),
        })?;

    Ok((sections, SectionHeader { kind, offset, size }))
}
