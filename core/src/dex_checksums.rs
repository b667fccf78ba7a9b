//! Dex checksums of an APK, read from its zip central directory.
//!
//! ART validates a compiled artifact by comparing each stored dex checksum
//! with the CRC32 the zip format already records for the matching
//! `classes*.dex` entry, so nothing is decompressed or recomputed here.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use odex_patcher_zip::ZipEntry;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::Result;
use crate::checksum::Checksum;

/// Ordered `classesN.dex` name to checksum map, in the order ART loads the dex files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DexChecksumMap {
    entries: Vec<(String, Checksum)>,
}

impl DexChecksumMap {
    pub fn from_apk(path: impl AsRef<Path>) -> Result<DexChecksumMap> {
        let path = path.as_ref();
        let map = DexChecksumMap::from_zip_bytes(&fs::read(path)?)?;
        debug!("{:?}: {} dex checksums", path, map.len());
        Ok(map)
    }

    pub fn from_zip_bytes(data: &[u8]) -> Result<DexChecksumMap> {
        let zip = ZipEntry::new(data)?;

        let mut indexed: BTreeMap<u32, (&str, u32)> = BTreeMap::new();
        for entry in zip.entries() {
            let name = entry.file_name.as_str();
            match multidex_index(name) {
                Some(index) => {
                    if indexed.insert(index, (name, entry.crc32)).is_some() {
                        warn!("duplicate {name} in archive, keeping the later entry");
                    }
                }
                None if name.starts_with("classes") && name.ends_with(".dex") => {
                    warn!("ignoring {name}, not a name ART loads");
                }
                None => {}
            }
        }

        let mut entries = Vec::with_capacity(indexed.len());
        let mut next = 1;
        while let Some((_, crc)) = indexed.remove(&next) {
            entries.push((normalized_name(next), Checksum::from_crc32(crc)));
            next += 1;
        }

        for (name, _) in indexed.values() {
            warn!("ignoring {name}, classes{next}.dex is missing");
        }

        Ok(DexChecksumMap { entries })
    }

    /// Number of dex files ART would load from the APK
    pub fn count_classes_dex(path: impl AsRef<Path>) -> Result<usize> {
        DexChecksumMap::from_apk(path).map(|map| map.len())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checksum of a dex file by its normalised name, `classes.dex` is `classes1.dex`
    pub fn get(&self, name: &str) -> Option<Checksum> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, checksum)| *checksum)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Checksum)> {
        self.entries
            .iter()
            .map(|(name, checksum)| (name.as_str(), *checksum))
    }

    /// Checksums in dex file order, ready for [`crate::Container::patch`]
    pub fn checksums(&self) -> Vec<Checksum> {
        self.entries.iter().map(|(_, checksum)| *checksum).collect()
    }
}

impl Serialize for DexChecksumMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, checksum) in &self.entries {
            map.serialize_entry(name, checksum)?;
        }
        map.end()
    }
}

/// Position of a top-level dex entry in ART's multidex sequence
///
/// `classes.dex` is the first, then `classes2.dex`, `classes3.dex` and so on.
/// `classes1.dex` and zero padded numbers are never opened by ART.
fn multidex_index(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("classes")?.strip_suffix(".dex")?;

    if digits.is_empty() {
        return Some(1);
    }

    if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok().filter(|index| *index >= 2)
}

fn normalized_name(index: u32) -> String {
    format!("classes{index}.dex")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::build_zip;

    #[test]
    fn classes_dex_is_first() {
        let zip = build_zip(&[
            ("classes2.dex", b"second".as_slice()),
            ("AndroidManifest.xml", b"<manifest/>".as_slice()),
            ("classes.dex", b"first".as_slice()),
        ]);
        let map = DexChecksumMap::from_zip_bytes(&zip).unwrap();

        let names: Vec<_> = map.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["classes1.dex", "classes2.dex"]);

        assert_eq!(
            map.get("classes1.dex"),
            Some(Checksum::from_crc32(crc32fast::hash(b"first")))
        );
        assert_eq!(
            map.get("classes2.dex"),
            Some(Checksum::from_crc32(crc32fast::hash(b"second")))
        );
        assert_eq!(map.get("classes.dex"), None);
    }

    #[test]
    fn numeric_order() {
        let mut files: Vec<(String, Vec<u8>)> = (2..=11)
            .rev()
            .map(|n| (format!("classes{n}.dex"), vec![n as u8; n]))
            .collect();
        files.push(("classes.dex".to_owned(), vec![1]));
        let files: Vec<(&str, &[u8])> = files
            .iter()
            .map(|(name, data)| (name.as_str(), data.as_slice()))
            .collect();

        let map = DexChecksumMap::from_zip_bytes(&build_zip(&files)).unwrap();
        let names: Vec<_> = map.iter().map(|(name, _)| name.to_owned()).collect();
        let expected: Vec<_> = (1..=11).map(|n| format!("classes{n}.dex")).collect();
        assert_eq!(names, expected);

        assert_eq!(
            map.checksums()[9],
            Checksum::from_crc32(crc32fast::hash(&[10; 10]))
        );
    }

    #[test]
    fn stops_at_first_gap() {
        let zip = build_zip(&[
            ("classes.dex", b"1".as_slice()),
            ("classes2.dex", b"2".as_slice()),
            ("classes4.dex", b"4".as_slice()),
        ]);

        assert_eq!(DexChecksumMap::from_zip_bytes(&zip).unwrap().len(), 2);
    }

    #[test]
    fn ignores_names_art_never_loads() {
        let zip = build_zip(&[
            ("classes1.dex", b"1".as_slice()),
            ("classes02.dex", b"2".as_slice()),
            ("lib/classes.dex", b"3".as_slice()),
            ("assets/classes2.dex", b"4".as_slice()),
            ("classesX.dex", b"5".as_slice()),
        ]);

        assert!(DexChecksumMap::from_zip_bytes(&zip).unwrap().is_empty());
    }

    #[test]
    fn serializes_in_dex_order() {
        let zip = build_zip(&[
            ("classes2.dex", b"b".as_slice()),
            ("classes.dex", b"a".as_slice()),
        ]);
        let map = DexChecksumMap::from_zip_bytes(&zip).unwrap();

        let json = serde_json::to_string(&map).unwrap();
        let expected = format!(
            r#"{{"classes1.dex":"{}","classes2.dex":"{}"}}"#,
            Checksum::from_crc32(crc32fast::hash(b"a")),
            Checksum::from_crc32(crc32fast::hash(b"b"))
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn counts_dex_files_of_an_apk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("base.apk");
        std::fs::write(
            &path,
            build_zip(&[
                ("classes.dex", b"1".as_slice()),
                ("classes2.dex", b"2".as_slice()),
                ("classes3.dex", b"3".as_slice()),
            ]),
        )
        .unwrap();

        assert_eq!(DexChecksumMap::count_classes_dex(&path).unwrap(), 3);
    }

    #[test]
    fn not_a_zip() {
        assert!(matches!(
            DexChecksumMap::from_zip_bytes(b"dex\n035\0"),
            Err(crate::ArtError::ZipError(_))
        ));
    }

    #[test]
    fn multidex_names() {
        assert_eq!(multidex_index("classes.dex"), Some(1));
        assert_eq!(multidex_index("classes2.dex"), Some(2));
        assert_eq!(multidex_index("classes100.dex"), Some(100));
        assert_eq!(multidex_index("classes1.dex"), None);
        assert_eq!(multidex_index("classes0.dex"), None);
        assert_eq!(multidex_index("classes+2.dex"), None);
        assert_eq!(multidex_index("classes.dex.bak"), None);
    }
}
