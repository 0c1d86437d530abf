//! Error types for grid source operations.

use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// File could not be opened or is not a recognized format
    #[error("Failed to open {path}: {reason}")]
    Open { path: String, reason: String },

    /// Missing required dimension
    #[error("Missing dimension: {0}")]
    MissingDimension(String),

    /// Missing required variable
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// Variable read failed or produced an unexpected number of values
    #[error("Failed to read variable {name}: {reason}")]
    Read { name: String, reason: String },
}
