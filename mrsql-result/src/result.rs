use crate::error::Error;

/// Result type alias used throughout mrsql.
pub type Result<T> = std::result::Result<T, Error>;
