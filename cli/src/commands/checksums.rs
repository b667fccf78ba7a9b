use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use odex_patcher::DexChecksumMap;

pub(crate) fn command_checksums(path: &Path, json: bool) -> Result<()> {
    let map = DexChecksumMap::from_apk(path).with_context(|| format!("can't read {:?}", path))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    if map.is_empty() {
        println!("{}", "no classes.dex in archive".yellow());
    }

    for (name, checksum) in map.iter() {
        println!(
            "{}: {} (crc32 {:#010x})",
            name,
            checksum.to_string().green(),
            checksum.to_crc32()
        );
    }

    Ok(())
}
