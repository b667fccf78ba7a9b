use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::errors::ArtError;

/// Instruction sets known to ART, named the way `dalvik-cache` and `oat/` directories are
///
/// See: `libartbase/arch/instruction_set.cc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionSet {
    #[default]
    None,
    Arm,
    Arm64,
    X86,
    X86_64,
}

impl InstructionSet {
    /// Map an Android ABI name (`ro.product.cpu.abilist`) to the instruction set ART uses for it
    pub fn from_abi(abi: &str) -> InstructionSet {
        match abi {
            "armeabi-v7a" | "armeabi" => InstructionSet::Arm,
            "arm64-v8a" => InstructionSet::Arm64,
            "x86" => InstructionSet::X86,
            "x86_64" => InstructionSet::X86_64,
            _ => InstructionSet::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InstructionSet::None => "none",
            InstructionSet::Arm => "arm",
            InstructionSet::Arm64 => "arm64",
            InstructionSet::X86 => "x86",
            InstructionSet::X86_64 => "x86_64",
        }
    }
}

impl fmt::Display for InstructionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstructionSet {
    type Err = ArtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(InstructionSet::None),
            "arm" => Ok(InstructionSet::Arm),
            "arm64" => Ok(InstructionSet::Arm64),
            "x86" => Ok(InstructionSet::X86),
            "x86_64" => Ok(InstructionSet::X86_64),
            _ => Err(ArtError::UnknownInstructionSet(s.to_owned())),
        }
    }
}
