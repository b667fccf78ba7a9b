use memchr::memmem;

use winnow::{
    binary::{le_u16, le_u32},
    prelude::*,
    token::take,
};

#[derive(Debug)]
pub(crate) struct EndOfCentralDirectory {
    pub(crate) total_entries: u16,
    pub(crate) central_dir_size: u32,
    pub(crate) central_dir_offset: u32,
}

impl EndOfCentralDirectory {
    const MAGIC: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];

    /// Fixed part of the record, without the trailing comment
    pub(crate) const MIN_SIZE: usize = 22;

    /// The comment length is a u16, so the record starts at most this far from the end
    const MAX_DISTANCE: usize = Self::MIN_SIZE + u16::MAX as usize;

    #[inline(always)]
    const fn magic_u32() -> u32 {
        u32::from_le_bytes(Self::MAGIC)
    }

    pub(crate) fn parse(input: &mut &[u8]) -> ModalResult<EndOfCentralDirectory> {
        let (
            _,
            _disk_number,
            _central_dir_start_disk,
            _entries_on_this_disk,
            total_entries,
            central_dir_size,
            central_dir_offset,
            comment_length,
        ) = (
            le_u32.verify(|magic| *magic == Self::magic_u32()), // magic
            le_u16,                                             // disk_number
            le_u16,                                             // central_dir_start_disk
            le_u16,                                             // entries_on_this_disk
            le_u16,                                             // total_entries
            le_u32,                                             // central_dir_size
            le_u32,                                             // central_dir_offset
            le_u16,                                             // comment_length
        )
            .parse_next(input)?;

        // the comment is not needed, but it must be present
        let _ = take(comment_length).parse_next(input)?;

        Ok(EndOfCentralDirectory {
            total_entries,
            central_dir_size,
            central_dir_offset,
        })
    }

    /// Searching magic from the end of the file
    ///
    /// A candidate counts only when its comment runs exactly to the end of the input.
    pub(crate) fn find_eocd(input: &[u8]) -> Option<usize> {
        if input.len() < Self::MIN_SIZE {
            return None;
        }

        let start = input.len().saturating_sub(Self::MAX_DISTANCE);
        let window = &input[start..input.len() - Self::MIN_SIZE + Self::MAGIC.len()];

        memmem::rfind_iter(window, &Self::MAGIC)
            .map(|pos| start + pos)
            .find(|&offset| Self::ends_input(input, offset))
    }

    fn ends_input(input: &[u8], offset: usize) -> bool {
        let Some(&[low, high]) = input.get(offset + 20..offset + Self::MIN_SIZE) else {
            return false;
        };

        offset + Self::MIN_SIZE + u16::from_le_bytes([low, high]) as usize == input.len()
    }
}
