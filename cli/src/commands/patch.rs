use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use odex_patcher::{ArtContainer, Checksum, Container, DexChecksumMap};

pub(crate) fn command_patch(
    path: &Path,
    from_apk: Option<&Path>,
    checksums: &[Checksum],
) -> Result<()> {
    let replacements = match from_apk {
        Some(apk) => DexChecksumMap::from_apk(apk)
            .with_context(|| format!("can't read {:?}", apk))?
            .checksums(),
        None => checksums.to_vec(),
    };

    let container =
        ArtContainer::open(path).with_context(|| format!("got error while parsing {:?}", path))?;

    container
        .patch(&replacements)
        .with_context(|| format!("can't patch {:?}", path))?;

    println!(
        "{}: {} {}",
        "Patched".green().bold(),
        container.kind(),
        path.display()
    );
    for (record, replacement) in container.records().iter().zip(&replacements) {
        println!(
            "  {:#010x} {} -> {}",
            record.offset,
            record.checksum,
            replacement.to_string().green()
        );
    }

    Ok(())
}
