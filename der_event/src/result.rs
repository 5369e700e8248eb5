use crate::error::Error;

/// crate-wide alias for DER operations
pub type Result<T> = ::std::result::Result<T, Error>;
