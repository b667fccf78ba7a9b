use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use crate::Result;
use crate::errors::ArtError;
use crate::isa::InstructionSet;
use crate::properties::{SystemProperties, isa_features, isa_variant};

/// Input of one compilation
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// APK or jar holding the dex files to compile
    pub dex_file: PathBuf,

    /// Location recorded in every `OatDexFile`, usually the APK name on the device
    pub dex_location: String,

    pub oat_file: PathBuf,
}

/// Files written by a successful compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    pub oat_file: PathBuf,

    /// Present when the compiler wrote one, i.e. on Android 8.0 and later
    pub vdex_file: Option<PathBuf>,
}

pub trait Compiler {
    fn compile(&self, request: &CompileRequest) -> Result<CompileOutput>;
}

/// `dex2oat` writes the VDEX beside the OAT file
pub fn vdex_path_for(oat_file: &Path) -> PathBuf {
    oat_file.with_extension("vdex")
}

/// Runs the device's `dex2oat` binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dex2Oat {
    pub binary: PathBuf,
    pub instruction_set: InstructionSet,
    pub variant: String,
    pub features: String,
}

impl Dex2Oat {
    pub fn new(instruction_set: InstructionSet) -> Dex2Oat {
        Dex2Oat {
            binary: PathBuf::from("dex2oat"),
            instruction_set,
            variant: instruction_set.as_str().to_owned(),
            features: "default".to_owned(),
        }
    }

    /// Variant and features as configured in `dalvik.vm.isa.*`
    pub fn from_properties(
        properties: &dyn SystemProperties,
        instruction_set: InstructionSet,
    ) -> Dex2Oat {
        Dex2Oat {
            variant: isa_variant(properties, instruction_set),
            features: isa_features(properties, instruction_set),
            ..Dex2Oat::new(instruction_set)
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Dex2Oat {
        self.binary = binary.into();
        self
    }

    pub fn args(&self, request: &CompileRequest) -> Vec<String> {
        vec![
            format!("--dex-file={}", request.dex_file.display()),
            format!("--dex-location={}", request.dex_location),
            format!("--oat-file={}", request.oat_file.display()),
            format!("--instruction-set={}", self.instruction_set),
            format!("--instruction-set-variant={}", self.variant),
            format!("--instruction-set-features={}", self.features),
        ]
    }
}

impl Compiler for Dex2Oat {
    fn compile(&self, request: &CompileRequest) -> Result<CompileOutput> {
        let args = self.args(request);
        debug!("{} {}", self.binary.display(), args.join(" "));

        let status = Command::new(&self.binary)
            .args(&args)
            .status()
            .map_err(ArtError::CompilerExec)?;

        if !status.success() {
            return Err(ArtError::CompilerExit(status));
        }

        if !request.oat_file.exists() {
            return Err(ArtError::MissingOutput(request.oat_file.clone()));
        }

        let vdex_file = vdex_path_for(&request.oat_file);
        let vdex_file = vdex_file.exists().then_some(vdex_file);

        info!(
            "compiled {:?} into {:?}",
            request.dex_file, request.oat_file
        );
        Ok(CompileOutput {
            oat_file: request.oat_file.clone(),
            vdex_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::StaticProperties;

    fn request(dir: &Path) -> CompileRequest {
        CompileRequest {
            dex_file: dir.join("source.apk"),
            dex_location: "base.apk".to_owned(),
            oat_file: dir.join("base.odex"),
        }
    }

    #[test]
    fn command_line() {
        let properties: StaticProperties = [("dalvik.vm.isa.arm64.variant", "kryo")]
            .into_iter()
            .collect();
        let dex2oat = Dex2Oat::from_properties(&properties, InstructionSet::Arm64);

        let request = CompileRequest {
            dex_file: PathBuf::from("/sdcard/patched.apk"),
            dex_location: "/data/app/com.example-1/base.apk".to_owned(),
            oat_file: PathBuf::from("/data/local/tmp/base.odex"),
        };

        assert_eq!(
            dex2oat.args(&request),
            vec![
                "--dex-file=/sdcard/patched.apk",
                "--dex-location=/data/app/com.example-1/base.apk",
                "--oat-file=/data/local/tmp/base.odex",
                "--instruction-set=arm64",
                "--instruction-set-variant=kryo",
                "--instruction-set-features=default",
            ]
        );
    }

    #[test]
    fn vdex_sits_next_to_oat() {
        assert_eq!(
            vdex_path_for(Path::new("/tmp/base.odex")),
            PathBuf::from("/tmp/base.vdex")
        );
    }

    #[test]
    fn missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let dex2oat = Dex2Oat::new(InstructionSet::Arm).with_binary(dir.path().join("dex2oat"));

        assert!(matches!(
            dex2oat.compile(&request(dir.path())),
            Err(ArtError::CompilerExec(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn failing_compiler() {
        let dir = tempfile::tempdir().unwrap();
        let dex2oat = Dex2Oat::new(InstructionSet::Arm).with_binary("false");

        assert!(matches!(
            dex2oat.compile(&request(dir.path())),
            Err(ArtError::CompilerExit(status)) if !status.success()
        ));
    }

    #[cfg(unix)]
    #[test]
    fn compiler_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let dex2oat = Dex2Oat::new(InstructionSet::Arm).with_binary("true");

        match dex2oat.compile(&request(dir.path())) {
            Err(ArtError::MissingOutput(path)) => assert_eq!(path, dir.path().join("base.odex")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
