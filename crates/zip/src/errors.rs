use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZipError {
    /// File doesn't start with a local file header
    #[error("invalid zip header, expected local file header magic")]
    InvalidHeader,

    /// Got EOF while reading data
    #[error("got EOF while parsing zip")]
    EOF,

    /// Provided file not found in zip
    #[error("file not exist in zip")]
    FileNotFound,

    /// Can't operate without EOCD
    #[error("can't find EOCD in zip")]
    NotFoundEOCD,

    /// Generic parsing error
    #[error("got error while parsing zip archive")]
    ParseError,
}
