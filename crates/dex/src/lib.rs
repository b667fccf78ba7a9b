pub mod errors;
pub mod header;

pub use errors::*;
pub use header::*;
