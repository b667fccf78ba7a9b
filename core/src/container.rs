use std::fmt;
use std::fs;
use std::path::Path;

use crate::Result;
use crate::checksum::{Checksum, ChecksumRecord};
use crate::cursor::Cursor;
use crate::errors::ArtError;
use crate::header::{ContainerKind, HeaderInfo};
use crate::oat::{ELF_MAGIC, OatFile};
use crate::patcher;
use crate::vdex::{VDEX_MAGIC, VdexFile};

/// Common surface of OAT and VDEX files
///
/// The header and checksum records are a snapshot taken when the file was
/// opened, [`Container::patch`] rewrites the file but never the snapshot.
pub trait Container {
    fn kind(&self) -> ContainerKind;

    fn path(&self) -> &Path;

    fn header(&self) -> &HeaderInfo;

    fn records(&self) -> &[ChecksumRecord];

    /// Checksums as found at open time, in dex file order
    fn checksums(&self) -> Vec<Checksum> {
        self.records()
            .iter()
            .map(|record| record.checksum)
            .collect()
    }

    /// Overwrite every dex checksum, one replacement per dex file in dex file order
    ///
    /// Nothing is written unless the replacement count matches and every
    /// record is still inside the file.
    fn patch(&self, replacements: &[Checksum]) -> Result<()> {
        patcher::write_checksums(self.path(), self.records(), replacements)
    }
}

pub(crate) fn fmt_container(
    container: &dyn Container,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    writeln!(f, "{} {:?}", container.kind(), container.path())?;
    writeln!(f, "  {}", container.header())?;
    for (index, record) in container.records().iter().enumerate() {
        writeln!(
            f,
            "  [{}] {:#x} = {}",
            index, record.offset, record.checksum
        )?;
    }
    Ok(())
}

/// Either container, picked by looking at the file
pub enum ArtContainer {
    Oat(OatFile),
    Vdex(VdexFile),
}

impl ArtContainer {
    /// Open a file and decide from its leading bytes whether it's a VDEX or an OAT (ELF) image
    pub fn open(path: impl AsRef<Path>) -> Result<ArtContainer> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let leading = Cursor::new(&data).read_array::<4>(0)?;

        if &leading == VDEX_MAGIC {
            VdexFile::from_bytes(path, &data).map(ArtContainer::Vdex)
        } else if &leading == ELF_MAGIC {
            OatFile::from_bytes(path, &data).map(ArtContainer::Oat)
        } else {
            Err(ArtError::InvalidMagic {
                expected: ELF_MAGIC.to_vec(),
                actual: leading.to_vec(),
            })
        }
    }

    fn inner(&self) -> &dyn Container {
        match self {
            ArtContainer::Oat(oat) => oat,
            ArtContainer::Vdex(vdex) => vdex,
        }
    }
}

impl Container for ArtContainer {
    fn kind(&self) -> ContainerKind {
        self.inner().kind()
    }

    fn path(&self) -> &Path {
        self.inner().path()
    }

    fn header(&self) -> &HeaderInfo {
        self.inner().header()
    }

    fn records(&self) -> &[ChecksumRecord] {
        self.inner().records()
    }
}

impl fmt::Display for ArtContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_container(self.inner(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, OatSpec, Stride};

    #[test]
    fn detects_both_kinds() {
        let dir = tempfile::tempdir().unwrap();

        let (oat, _) = testing::build_oat(
            &OatSpec::new("124", 18, 5, None, Stride::Words(4)),
            &[("base.apk", [1, 2, 3, 4])],
        );
        let oat_path = dir.path().join("base.odex");
        std::fs::write(&oat_path, oat).unwrap();

        let vdex = testing::build_vdex_fixed("006", 8, 24, &[[5, 6, 7, 8]]);
        let vdex_path = dir.path().join("base.vdex");
        std::fs::write(&vdex_path, vdex).unwrap();

        let container = ArtContainer::open(&oat_path).unwrap();
        assert_eq!(container.kind(), ContainerKind::Oat);
        assert_eq!(container.checksums(), vec![Checksum::new([1, 2, 3, 4])]);

        let container = ArtContainer::open(&vdex_path).unwrap();
        assert_eq!(container.kind(), ContainerKind::Vdex);
        assert_eq!(container.checksums(), vec![Checksum::new([5, 6, 7, 8])]);
        assert!(container.to_string().contains("05060708"));
    }

    #[test]
    fn unknown_leading_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("random.bin");
        std::fs::write(&path, b"PK\x03\x04 this is a zip").unwrap();

        match ArtContainer::open(&path) {
            Err(ArtError::InvalidMagic { expected, actual }) => {
                assert_eq!(expected, b"\x7fELF");
                assert_eq!(actual, b"PK\x03\x04");
            }
            Err(err) => panic!("unexpected error: {err}"),
            Ok(_) => panic!("random data was accepted"),
        }
    }
}
