//! Patch the dex checksums stored in ART's OAT and VDEX files.
//!
//! ART only loads a compiled artifact when every dex checksum it recorded
//! equals the CRC32 of the matching `classes*.dex` entry of the installed
//! APK. Rewriting those checksums lets artifacts compiled from one APK be
//! used for another.
//!
//! ```ignore
//! let target = DexChecksumMap::from_apk("/data/app/com.example-1/base.apk")?;
//! let oat = OatFile::open("base.odex")?;
//! oat.patch(&target.checksums())?;
//! ```

pub mod checksum;
pub mod container;
pub mod cursor;
pub mod dex2oat;
pub mod dex_checksums;
pub mod errors;
pub mod header;
pub mod isa;
pub mod layout;
pub mod oat;
pub mod paths;
pub mod properties;
pub mod vdex;
pub mod workflow;

pub(crate) mod patcher;

#[cfg(test)]
pub(crate) mod testing;

pub use checksum::{Checksum, ChecksumRecord};
pub use container::{ArtContainer, Container};
pub use dex2oat::{CompileOutput, CompileRequest, Compiler, Dex2Oat};
pub use dex_checksums::DexChecksumMap;
pub use errors::ArtError;
pub use header::{ContainerKind, HeaderInfo};
pub use isa::InstructionSet;
pub use oat::OatFile;
pub use paths::DeviceLayout;
pub use properties::{Getprop, StaticProperties, SystemProperties};
pub use vdex::VdexFile;
pub use workflow::{DeployStep, Deployment, PatchJob};

pub type Result<T> = std::result::Result<T, ArtError>;
