//! Compile a replacement APK and make its artifacts pass for the installed one.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::Result;
use crate::container::Container;
use crate::dex2oat::{CompileRequest, Compiler, vdex_path_for};
use crate::dex_checksums::DexChecksumMap;
use crate::errors::ArtError;
use crate::oat::OatFile;
use crate::paths::DeviceLayout;
use crate::vdex::VdexFile;

#[derive(Debug, Clone)]
pub struct PatchJob {
    /// APK whose code ends up compiled
    pub source_apk: PathBuf,

    /// Installed APK the artifacts have to match
    pub target_apk: PathBuf,

    /// Where the compiled and patched files are written
    pub work_dir: PathBuf,

    pub layout: DeviceLayout,
}

/// One patched file and where it belongs on the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployStep {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deployment {
    pub steps: Vec<DeployStep>,
}

impl PatchJob {
    /// Run every step, stopping at the first failure
    pub fn run(&self, compiler: &dyn Compiler) -> Result<Deployment> {
        let source = DexChecksumMap::from_apk(&self.source_apk)?;
        let target = DexChecksumMap::from_apk(&self.target_apk)?;
        info!(
            "source has {} dex files, target has {}",
            source.len(),
            target.len()
        );

        if source.len() != target.len() {
            return Err(ArtError::ChecksumCountMismatch {
                expected: target.len(),
                actual: source.len(),
            });
        }

        let dex_location = self
            .target_apk
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let oat_name = artifact_file_name(&self.target_apk, "odex");
        let request = CompileRequest {
            dex_file: self.source_apk.clone(),
            dex_location,
            oat_file: self.work_dir.join(oat_name),
        };
        info!(
            "compiling {:?} as {}",
            request.dex_file, request.dex_location
        );
        let output = compiler.compile(&request)?;

        let checksums = target.checksums();

        let oat = OatFile::open(&output.oat_file)?;
        oat.patch(&checksums)?;
        info!("patched {:?}", output.oat_file);

        let mut steps = vec![DeployStep {
            from: output.oat_file.clone(),
            to: self.layout.oat_file(&self.target_apk),
        }];

        if let Some(destination) = self.layout.vdex_file(&self.target_apk) {
            let vdex_file = output
                .vdex_file
                .unwrap_or_else(|| vdex_path_for(&output.oat_file));

            let vdex = VdexFile::open(&vdex_file)?;
            vdex.patch(&checksums)?;
            info!("patched {:?}", vdex_file);

            steps.push(DeployStep {
                from: vdex_file,
                to: destination,
            });
        }

        Ok(Deployment { steps })
    }
}

impl Deployment {
    /// Plain copy of every file into place, creating missing directories
    ///
    /// Ownership and SELinux labels of the copies are left as the process creates them.
    pub fn install(&self) -> Result<()> {
        for step in &self.steps {
            if let Some(parent) = step.to.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&step.from, &step.to)?;
            info!("installed {:?} -> {:?}", step.from, step.to);
        }
        Ok(())
    }
}

fn artifact_file_name(apk: &Path, extension: &str) -> String {
    let stem = apk
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "base".to_owned());
    format!("{stem}.{extension}")
}
