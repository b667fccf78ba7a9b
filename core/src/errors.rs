use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use odex_patcher_dex::DexError;
use odex_patcher_zip::ZipError;
use thiserror::Error;

use crate::header::ContainerKind;

#[derive(Error, Debug)]
pub enum ArtError {
    /// Generic I/O error while trying to read or write data
    #[error(transparent)]
    IoError(#[from] io::Error),

    /// Leading bytes of the container don't match the expected signature
    #[error(
        "invalid magic, expected {} but got {}",
        const_hex::encode(expected),
        const_hex::encode(actual)
    )]
    InvalidMagic { expected: Vec<u8>, actual: Vec<u8> },

    /// Version string isn't present in the layout registry
    #[error("unsupported {kind} version {version:?}")]
    UnknownVersion {
        kind: ContainerKind,
        version: String,
    },

    /// A read would go past the end of the file
    #[error("read of {length} bytes at {offset:#x} past file size {file_size:#x}")]
    TruncatedFile {
        offset: u64,
        length: u64,
        file_size: u64,
    },

    /// Replacement checksums don't line up with the container's dex files
    #[error("checksum count mismatch, expected {expected} but got {actual}")]
    ChecksumCountMismatch { expected: usize, actual: usize },

    /// A computed record offset points outside of the file
    #[error("offset {offset:#x} is outside of the file (size {file_size:#x})")]
    OffsetOutOfBounds { offset: u64, file_size: u64 },

    /// Container declares no dex files, there is nothing to patch
    #[error("container has no dex checksums to patch")]
    EmptyChecksums,

    /// Name doesn't match any instruction set ART compiles for
    #[error("unknown instruction set {0:?}")]
    UnknownInstructionSet(String),

    /// Error occurred while reading the apk as zip archive
    #[error("got error while parsing apk archive")]
    ZipError(#[from] ZipError),

    /// Error occurred while decoding a dex header embedded in an oat file
    #[error("got error while parsing embedded dex header")]
    DexError(#[from] DexError),

    /// The external compiler could not be started
    #[error("failed to execute dex2oat")]
    CompilerExec(#[source] io::Error),

    /// The external compiler ran but reported a failure
    #[error("dex2oat failed with {0}")]
    CompilerExit(ExitStatus),

    /// The external compiler succeeded but didn't produce the expected file
    #[error("dex2oat did not produce {0:?}")]
    MissingOutput(PathBuf),
}
