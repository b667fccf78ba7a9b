use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::DeviceArgs;
use crate::commands::device::resolve_layout;

pub(crate) fn command_paths(apk: &Path, device: &DeviceArgs) -> Result<()> {
    let layout = resolve_layout(device);

    println!(
        "{}: {} ({})",
        "Device",
        format!("SDK {}", layout.sdk_int).green(),
        layout.isa
    );
    println!("{}: {}", "OAT folder", layout.oat_dir(apk).display());
    println!("{}: {}", "OAT file", layout.oat_file(apk).display());
    println!(
        "{}: {}",
        "VDEX file",
        layout
            .vdex_file(apk)
            .map(|vdex| vdex.display().to_string())
            .unwrap_or("-".to_owned())
    );

    let optimized = if layout.is_optimized(apk) {
        "yes".green()
    } else {
        "no".red()
    };
    println!("{}: {}", "Optimized", optimized);

    Ok(())
}
