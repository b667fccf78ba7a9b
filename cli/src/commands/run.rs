use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use odex_patcher::{Dex2Oat, Getprop, PatchJob};

use crate::DeviceArgs;
use crate::commands::device::resolve_layout;

#[allow(clippy::too_many_arguments)]
pub(crate) fn command_run(
    source: &Path,
    target: &Path,
    work_dir: &Path,
    dex2oat: &Path,
    variant: Option<&str>,
    features: Option<&str>,
    install: bool,
    device: &DeviceArgs,
) -> Result<()> {
    let layout = resolve_layout(device);

    let mut compiler = match (variant, features) {
        (Some(_), Some(_)) => Dex2Oat::new(layout.isa),
        _ => Dex2Oat::from_properties(&Getprop::new(), layout.isa),
    }
    .with_binary(dex2oat);

    if let Some(variant) = variant {
        compiler.variant = variant.to_owned();
    }
    if let Some(features) = features {
        compiler.features = features.to_owned();
    }

    let job = PatchJob {
        source_apk: source.to_path_buf(),
        target_apk: target.to_path_buf(),
        work_dir: work_dir.to_path_buf(),
        layout,
    };

    let deployment = job
        .run(&compiler)
        .with_context(|| format!("can't build artifacts for {:?}", target))?;

    for step in &deployment.steps {
        println!(
            "{} -> {}",
            step.from.display().to_string().green(),
            step.to.display()
        );
    }

    if install {
        deployment
            .install()
            .with_context(|| "can't copy patched files into place")?;
        println!("{}", "Installed".green().bold());
    }

    Ok(())
}
