//! Error types for observation table operations.

use thiserror::Error;

/// Result type alias using TableError.
pub type TableResult<T> = Result<T, TableError>;

/// Shape and lookup errors raised by [`crate::IodaVars`].
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Column '{column}' has {actual} entries, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown metadata column: {0}")]
    UnknownMetadata(String),

    #[error("Location {location} out of range (table has {count} locations)")]
    LocationOutOfRange { location: usize, count: usize },

    #[error("Channel {channel} out of range (table has {count} channels)")]
    ChannelOutOfRange { channel: usize, count: usize },

    #[error("Cannot concatenate tables: {0}")]
    Incompatible(String),
}
