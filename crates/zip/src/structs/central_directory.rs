use winnow::binary::{le_u16, le_u32};
use winnow::combinator::repeat;
use winnow::error::{ErrMode, Needed};
use winnow::prelude::*;
use winnow::token::take;

use crate::structs::eocd::EndOfCentralDirectory;

/// A single record of the central directory
///
/// Only the fields needed to identify an entry and its stored checksum are kept.
#[derive(Debug, Clone)]
pub struct CentralDirectoryEntry {
    /// CRC32 of the uncompressed data exactly as stored by the archiver
    pub crc32: u32,
    pub uncompressed_size: u32,
    pub file_name: String,
}

impl CentralDirectoryEntry {
    const MAGIC: u32 = 0x02014b50;

    #[inline(always)]
    fn parse(input: &mut &[u8]) -> ModalResult<CentralDirectoryEntry> {
        let (
            _,
            _version_made_by,
            _version_needed,
            _general_purpose,
            _compression_method,
            _last_mod_time,
            _last_mod_date,
            crc32,
            _compressed_size,
            uncompressed_size,
            file_name_length,
            extra_field_length,
            file_comment_length,
            _disk_number_start,
            _internal_attrs,
            _external_attrs,
            _local_header_offset,
        ) = (
            le_u32.verify(|magic| *magic == Self::MAGIC), // magic
            le_u16,                                       // version_made_by
            le_u16,                                       // version_needed
            le_u16,                                       // general_purpose
            le_u16,                                       // compression_method
            le_u16,                                       // last_mod_time
            le_u16,                                       // last_mod_date
            le_u32,                                       // crc32
            le_u32,                                       // compressed_size
            le_u32,                                       // uncompressed_size
            le_u16,                                       // file_name_length
            le_u16,                                       // extra_field_length
            le_u16,                                       // file_comment_length
            le_u16,                                       // disk_number_start
            le_u16,                                       // internal_attrs
            le_u32,                                       // external_attrs
            le_u32,                                       // local_header_offset
        )
            .parse_next(input)?;

        let (file_name, _, _) = (
            take(file_name_length),
            take(extra_field_length),
            take(file_comment_length),
        )
            .parse_next(input)?;

        Ok(CentralDirectoryEntry {
            crc32,
            uncompressed_size,
            file_name: String::from_utf8_lossy(file_name).to_string(),
        })
    }
}

#[derive(Debug)]
pub(crate) struct CentralDirectory {
    /// Entries in the order they appear in the archive
    pub(crate) entries: Vec<CentralDirectoryEntry>,
}

impl CentralDirectory {
    pub(crate) fn parse(
        input: &[u8],
        eocd: &EndOfCentralDirectory,
    ) -> ModalResult<CentralDirectory> {
        let mut input = input
            .get(eocd.central_dir_offset as usize..)
            .ok_or(ErrMode::Incomplete(Needed::Unknown))?;

        // exactly the declared number of records, anything after them is ignored
        let entries: Vec<CentralDirectoryEntry> =
            repeat(eocd.total_entries as usize, CentralDirectoryEntry::parse)
                .parse_next(&mut input)?;

        Ok(CentralDirectory { entries })
    }
}
