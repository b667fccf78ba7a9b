//! Offset-addressed reads over an in-memory copy of a container.
//!
//! Every read is bounds checked and reports [`ArtError::TruncatedFile`] instead of panicking.

use crate::errors::ArtError;

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    data: &'a [u8],
}

impl<'a> Cursor<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Cursor<'a> {
        Cursor { data }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether `length` bytes starting at `offset` are inside the data
    #[inline]
    pub fn contains(&self, offset: u64, length: u64) -> bool {
        offset
            .checked_add(length)
            .is_some_and(|end| end <= self.len())
    }

    pub fn read_bytes(&self, offset: u64, length: u64) -> Result<&'a [u8], ArtError> {
        if !self.contains(offset, length) {
            return Err(ArtError::TruncatedFile {
                offset,
                length,
                file_size: self.len(),
            });
        }

        // bounds were checked above, both values fit in usize
        let start = offset as usize;
        Ok(&self.data[start..start + length as usize])
    }

    /// Everything from `offset` to the end of the data
    pub fn tail(&self, offset: u64) -> Result<&'a [u8], ArtError> {
        let length = self.len().saturating_sub(offset);
        self.read_bytes(offset, length)
    }

    pub fn read_array<const N: usize>(&self, offset: u64) -> Result<[u8; N], ArtError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(offset, N as u64)?);
        Ok(out)
    }

    #[inline]
    pub fn read_u32_le(&self, offset: u64) -> Result<u32, ArtError> {
        self.read_array(offset).map(u32::from_le_bytes)
    }

    #[inline]
    pub fn read_u32_be(&self, offset: u64) -> Result<u32, ArtError> {
        self.read_array(offset).map(u32::from_be_bytes)
    }
}
