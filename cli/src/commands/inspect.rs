use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use odex_patcher::{ArtContainer, ChecksumRecord, Container, ContainerKind, HeaderInfo};
use serde::Serialize;

use crate::commands::path_helpers::get_all_files;

#[derive(Serialize)]
struct Report<'a> {
    path: &'a Path,
    kind: ContainerKind,
    header: &'a HeaderInfo,
    records: &'a [ChecksumRecord],
}

pub(crate) fn command_inspect(paths: &[PathBuf], json: bool) -> Result<()> {
    let files = get_all_files(paths, &["odex", "oat", "vdex"]);
    if files.is_empty() {
        bail!("no OAT or VDEX files found");
    }

    let containers = files
        .iter()
        .map(|path| {
            ArtContainer::open(path).with_context(|| format!("got error while parsing {:?}", path))
        })
        .collect::<Result<Vec<_>>>()?;

    if json {
        let reports: Vec<Report> = containers
            .iter()
            .map(|container| Report {
                path: container.path(),
                kind: container.kind(),
                header: container.header(),
                records: container.records(),
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for (i, container) in containers.iter().enumerate() {
        show(container);

        if i != containers.len() - 1 {
            println!();
        }
    }

    Ok(())
}

fn show(container: &ArtContainer) {
    let header = container.header();

    println!(
        "{}: {}",
        "File",
        container.path().display().to_string().green()
    );
    println!("{}: {}", "Type", container.kind().name().green());
    println!(
        "{}: {} (Android {})",
        "Version",
        header.version.green(),
        header.release
    );
    println!(
        "{}: {}",
        "Dex files",
        header.dex_file_count.to_string().green()
    );
    println!("{}: {:#x}", "Header size", header.header_size);
    println!("{}: {:#x}", "Checksum table", header.checksum_table_offset);

    for (i, record) in container.records().iter().enumerate() {
        println!(
            "  [{}] {:#010x} {}",
            i,
            record.offset,
            record.checksum.to_string().yellow()
        );
    }
}
