//! Error types for the conversion pipeline.

use thiserror::Error;

/// Errors that can occur while converting provider files.
///
/// Only [`PreprocError::Config`] is fatal to a run. Every other variant is a
/// per-file problem that a decoder turns into an empty table and a warning.
#[derive(Error, Debug)]
pub enum PreprocError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to open {path}: {reason}")]
    FileOpen { path: String, reason: String },

    #[error("Schema mismatch: {0}")]
    Schema(String),

    #[error("Value out of range: {0}")]
    Range(String),

    #[error("Observation table error: {0}")]
    Table(#[from] ioda_common::TableError),

    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PreprocError {
    /// Whether a batch run may continue with the next file.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PreprocError::Config(_))
    }
}

impl From<netcdf_parser::NetCdfError> for PreprocError {
    fn from(err: netcdf_parser::NetCdfError) -> Self {
        use netcdf_parser::NetCdfError;
        match err {
            NetCdfError::Open { path, reason } => PreprocError::FileOpen { path, reason },
            NetCdfError::IoError(e) => PreprocError::Io(e),
            other => PreprocError::Schema(other.to_string()),
        }
    }
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, PreprocError>;

#[cfg(test)]
mod tests {
    use super::*;
    use netcdf_parser::NetCdfError;

    #[test]
    fn test_only_config_is_fatal() {
        assert!(!PreprocError::Config("bad".into()).is_recoverable());
        assert!(PreprocError::Schema("x".into()).is_recoverable());
        assert!(PreprocError::Range("x".into()).is_recoverable());
        assert!(PreprocError::FileOpen {
            path: "a".into(),
            reason: "b".into()
        }
        .is_recoverable());
    }

    #[test]
    fn test_netcdf_error_mapping() {
        let open: PreprocError = NetCdfError::Open {
            path: "f.nc".into(),
            reason: "corrupt".into(),
        }
        .into();
        assert!(matches!(open, PreprocError::FileOpen { .. }));

        let missing: PreprocError = NetCdfError::MissingVariable("latitude".into()).into();
        assert!(matches!(missing, PreprocError::Schema(_)));
    }
}
