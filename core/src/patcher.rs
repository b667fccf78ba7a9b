use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, info};

use crate::Result;
use crate::checksum::{Checksum, ChecksumRecord};
use crate::errors::ArtError;

/// Replace the four bytes of every record with the matching replacement
///
/// All checks happen before the first write: the replacement count, a
/// non-empty table and every record lying inside the current file.
/// Values already on disk are left alone.
pub(crate) fn write_checksums(
    path: &Path,
    records: &[ChecksumRecord],
    replacements: &[Checksum],
) -> Result<()> {
    if replacements.len() != records.len() {
        return Err(ArtError::ChecksumCountMismatch {
            expected: records.len(),
            actual: replacements.len(),
        });
    }

    if records.is_empty() {
        return Err(ArtError::EmptyChecksums);
    }

    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    let file_size = file.metadata()?.len();

    for record in records {
        let inside = record
            .offset
            .checked_add(4)
            .is_some_and(|end| end <= file_size);
        if !inside {
            return Err(ArtError::OffsetOutOfBounds {
                offset: record.offset,
                file_size,
            });
        }
    }

    let mut written = 0;
    for (record, replacement) in records.iter().zip(replacements) {
        let mut on_disk = [0u8; 4];
        file.seek(SeekFrom::Start(record.offset))?;
        file.read_exact(&mut on_disk)?;
        let on_disk = Checksum::new(on_disk);

        if on_disk == *replacement {
            debug!("{:#x}: already {}", record.offset, replacement);
            continue;
        }

        debug!(
            "{:#x}: {} -> {} [{}]",
            record.offset, on_disk, replacement, record.checksum
        );
        file.seek(SeekFrom::Start(record.offset))?;
        file.write_all(replacement.as_bytes())?;
        written += 1;
    }

    file.sync_all()?;
    info!(
        "patched {} of {} checksums in {:?}",
        written,
        records.len(),
        path
    );

    Ok(())
}
