use log::debug;

use crate::errors::ZipError;
use crate::structs::central_directory::{CentralDirectory, CentralDirectoryEntry};
use crate::structs::eocd::EndOfCentralDirectory;

/// Represents the central directory of a ZIP archive
///
/// File data is never decompressed, the directory alone carries everything
/// needed to match an APK against compiled artifacts.
#[derive(Debug)]
pub struct ZipEntry {
    central_directory: CentralDirectory,
}

impl ZipEntry {
    pub fn new(input: &[u8]) -> Result<ZipEntry, ZipError> {
        // perform basic sanity check
        if !input.starts_with(b"PK\x03\x04") {
            return Err(ZipError::InvalidHeader);
        }

        let eocd_offset = EndOfCentralDirectory::find_eocd(input).ok_or(ZipError::NotFoundEOCD)?;

        let eocd = EndOfCentralDirectory::parse(&mut &input[eocd_offset..])
            .map_err(|_| ZipError::ParseError)?;

        debug!(
            "eocd at {:#x}: {} entries, central directory at {:#x} ({} bytes)",
            eocd_offset, eocd.total_entries, eocd.central_dir_offset, eocd.central_dir_size
        );

        if eocd.central_dir_offset as usize > eocd_offset {
            return Err(ZipError::EOF);
        }

        let central_directory =
            CentralDirectory::parse(input, &eocd).map_err(|_| ZipError::ParseError)?;

        Ok(ZipEntry { central_directory })
    }

    /// Get list of the filenames from zip archive, in central directory order
    pub fn namelist(&self) -> impl Iterator<Item = &str> {
        self.central_directory
            .entries
            .iter()
            .map(|entry| entry.file_name.as_str())
    }

    /// All central directory records, in archive order
    #[inline]
    pub fn entries(&self) -> &[CentralDirectoryEntry] {
        &self.central_directory.entries
    }

    /// Look up a record by its exact name
    pub fn entry(&self, filename: &str) -> Result<&CentralDirectoryEntry, ZipError> {
        self.central_directory
            .entries
            .iter()
            .find(|entry| entry.file_name == filename)
            .ok_or(ZipError::FileNotFound)
    }

    /// Stored CRC32 of the given file
    #[inline]
    pub fn crc32(&self, filename: &str) -> Result<u32, ZipError> {
        self.entry(filename).map(|entry| entry.crc32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal stored archive, returning its bytes
    fn build_zip(files: &[(&str, &[u8])], comment: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut central = Vec::new();

        for (name, data) in files {
            let crc = crc32fast::hash(data);
            let offset = out.len() as u32;

            out.extend_from_slice(b"PK\x03\x04");
            out.extend_from_slice(&20u16.to_le_bytes()); // version needed
            out.extend_from_slice(&0u16.to_le_bytes()); // flags
            out.extend_from_slice(&0u16.to_le_bytes()); // stored
            out.extend_from_slice(&[0; 4]); // time, date
            out.extend_from_slice(&crc.to_le_bytes());
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            out.extend_from_slice(&(name.len() as u16).to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(data);

            central.extend_from_slice(b"PK\x01\x02");
            central.extend_from_slice(&20u16.to_le_bytes()); // made by
            central.extend_from_slice(&20u16.to_le_bytes()); // needed
            central.extend_from_slice(&0u16.to_le_bytes()); // flags
            central.extend_from_slice(&0u16.to_le_bytes()); // stored
            central.extend_from_slice(&[0; 4]); // time, date
            central.extend_from_slice(&crc.to_le_bytes());
            central.extend_from_slice(&(data.len() as u32).to_le_bytes());
            central.extend_from_slice(&(data.len() as u32).to_le_bytes());
            central.extend_from_slice(&(name.len() as u16).to_le_bytes());
            central.extend_from_slice(&[0; 4]); // extra, comment length
            central.extend_from_slice(&[0; 4]); // disk, internal attrs
            central.extend_from_slice(&[0; 4]); // external attrs
            central.extend_from_slice(&offset.to_le_bytes());
            central.extend_from_slice(name.as_bytes());
        }

        let central_offset = out.len() as u32;
        out.extend_from_slice(&central);

        out.extend_from_slice(b"PK\x05\x06");
        out.extend_from_slice(&[0; 4]); // disk numbers
        out.extend_from_slice(&(files.len() as u16).to_le_bytes());
        out.extend_from_slice(&(files.len() as u16).to_le_bytes());
        out.extend_from_slice(&(central.len() as u32).to_le_bytes());
        out.extend_from_slice(&central_offset.to_le_bytes());
        out.extend_from_slice(&(comment.len() as u16).to_le_bytes());
        out.extend_from_slice(comment);

        out
    }

    #[test]
    fn reads_stored_crc_values() {
        let zip = build_zip(
            &[
                ("AndroidManifest.xml", b"manifest"),
                ("classes.dex", b"dex\n035\0first"),
                ("classes2.dex", b"dex\n035\0second"),
            ],
            b"",
        );

        let entry = ZipEntry::new(&zip).unwrap();
        assert_eq!(
            entry.namelist().collect::<Vec<_>>(),
            vec!["AndroidManifest.xml", "classes.dex", "classes2.dex"]
        );
        assert_eq!(
            entry.crc32("classes.dex").unwrap(),
            crc32fast::hash(b"dex\n035\0first")
        );
        assert_eq!(
            entry.crc32("classes2.dex").unwrap(),
            crc32fast::hash(b"dex\n035\0second")
        );
    }

    #[test]
    fn finds_eocd_behind_comment() {
        let zip = build_zip(&[("classes.dex", b"payload")], b"signed by nobody");

        let entry = ZipEntry::new(&zip).unwrap();
        assert_eq!(entry.entries().len(), 1);
        assert_eq!(entry.entries()[0].uncompressed_size, 7);
    }

    #[test]
    fn signature_inside_comment_is_skipped() {
        let comment = [b"PK\x05\x06".as_slice(), &[0; 18], b"trailer"].concat();
        let zip = build_zip(&[("classes.dex", b"payload")], &comment);

        let entry = ZipEntry::new(&zip).unwrap();
        assert_eq!(entry.namelist().collect::<Vec<_>>(), vec!["classes.dex"]);
        assert_eq!(
            entry.crc32("classes.dex").unwrap(),
            crc32fast::hash(b"payload")
        );
    }

    #[test]
    fn comment_must_reach_the_end() {
        let zip = build_zip(&[("classes.dex", b"payload")], b"comment");

        // the record still claims a 7 byte comment
        let cut = &zip[..zip.len() - 1];
        assert!(matches!(ZipEntry::new(cut), Err(ZipError::NotFoundEOCD)));
    }

    #[test]
    fn missing_file_is_reported() {
        let zip = build_zip(&[("classes.dex", b"payload")], b"");

        let entry = ZipEntry::new(&zip).unwrap();
        assert!(matches!(
            entry.crc32("classes2.dex"),
            Err(ZipError::FileNotFound)
        ));
    }

    #[test]
    fn rejects_non_zip_input() {
        assert!(matches!(
            ZipEntry::new(b"\x7fELF not a zip"),
            Err(ZipError::InvalidHeader)
        ));
    }

    #[test]
    fn rejects_truncated_archive() {
        let zip = build_zip(&[("classes.dex", b"payload")], b"");

        // cut the end of central directory record off
        let truncated = &zip[..zip.len() - 10];
        assert!(matches!(
            ZipEntry::new(truncated),
            Err(ZipError::NotFoundEOCD)
        ));
    }
}
