//! Where an installed APK's compiled artifacts live on the device.
//!
//! KitKat keeps every OAT in `/data/dalvik-cache`, Lollipop splits it per
//! instruction set and Marshmallow moves it next to the APK under `oat/<isa>/`.
//! VDEX files exist since Oreo.

use std::path::{Path, PathBuf};

use log::warn;
use serde::Serialize;

use crate::isa::InstructionSet;
use crate::properties::SystemProperties;

const KITKAT: u32 = 19;
const MARSHMALLOW: u32 = 23;
const OREO: u32 = 26;

const DALVIK_CACHE: &str = "/data/dalvik-cache";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceLayout {
    pub sdk_int: u32,
    pub isa: InstructionSet,
}

impl DeviceLayout {
    pub fn new(sdk_int: u32, isa: InstructionSet) -> DeviceLayout {
        DeviceLayout { sdk_int, isa }
    }

    /// Layout of the device answering `properties`
    pub fn detect(properties: &dyn SystemProperties) -> DeviceLayout {
        let sdk = properties.get("ro.build.version.sdk", "0");
        let sdk_int = sdk.parse().unwrap_or_else(|_| {
            warn!("ro.build.version.sdk is {sdk:?}, not a number");
            0
        });

        let abilist = properties.get("ro.product.cpu.abilist", "");
        let abi = match abilist.split(',').map(str::trim).find(|s| !s.is_empty()) {
            Some(abi) => abi.to_owned(),
            None => properties.get("ro.product.cpu.abi", ""),
        };

        DeviceLayout {
            sdk_int,
            isa: InstructionSet::from_abi(&abi),
        }
    }

    /// VDEX files exist since Android 8.0
    #[inline]
    pub fn has_vdex(&self) -> bool {
        self.sdk_int >= OREO
    }

    pub fn oat_dir(&self, base_apk: &Path) -> PathBuf {
        if self.sdk_int == KITKAT {
            PathBuf::from(DALVIK_CACHE)
        } else if self.sdk_int < MARSHMALLOW {
            Path::new(DALVIK_CACHE).join(self.isa.as_str())
        } else {
            base_apk
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join("oat")
                .join(self.isa.as_str())
        }
    }

    /// Compiled code for `base_apk`
    ///
    /// Before Marshmallow the file is named after the full APK path, e.g.
    /// `data@app@com.example-1.apk@classes.dex`.
    pub fn oat_file(&self, base_apk: &Path) -> PathBuf {
        let dir = self.oat_dir(base_apk);

        if self.sdk_int < MARSHMALLOW {
            let full = base_apk.to_string_lossy();
            let relative: &str = full.strip_prefix('/').unwrap_or(&full);
            let flattened = relative.replace('/', "@");
            dir.join(format!("{flattened}@classes.dex"))
        } else {
            dir.join(artifact_name(base_apk, "odex"))
        }
    }

    pub fn vdex_file(&self, base_apk: &Path) -> Option<PathBuf> {
        if !self.has_vdex() {
            return None;
        }

        Some(self.oat_dir(base_apk).join(artifact_name(base_apk, "vdex")))
    }

    /// Whether the compiled artifacts for `base_apk` are present
    pub fn is_optimized(&self, base_apk: &Path) -> bool {
        let vdex_present = self.vdex_file(base_apk).is_none_or(|vdex| vdex.exists());
        self.oat_dir(base_apk).exists() && self.oat_file(base_apk).exists() && vdex_present
    }
}

/// `base.apk` becomes `base.<extension>`, dots inside the stem are kept
fn artifact_name(base_apk: &Path, extension: &str) -> PathBuf {
    let mut name = base_apk
        .file_stem()
        .unwrap_or(base_apk.as_os_str())
        .to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}
