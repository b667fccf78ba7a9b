//! Errors returned by this crate.
//!
//! This module contains the definitions for all error types returned by this crate.

use thiserror::Error;

/// Errors that may occur while decoding a dex header.
#[derive(Error, Debug)]
pub enum DexError {
    #[error("got unknown dex version: {0:#06x}")]
    UnknownVersion(u16),

    #[error("invalid header")]
    InvalidHeader,

    #[error("dex header is truncated, got {size} bytes but need {needed}")]
    Truncated { size: usize, needed: usize },
}
