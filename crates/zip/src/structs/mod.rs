pub(crate) mod central_directory;
pub(crate) mod eocd;
