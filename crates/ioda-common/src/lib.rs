//! Common types shared by the observation converters.
//!
//! The central type is [`IodaVars`], the in-memory observation table every
//! provider decoder produces and every writer consumes.

pub mod error;
pub mod missing;
pub mod table;
pub mod time;

pub use error::{TableError, TableResult};
pub use missing::{datetime_to_int64, MISSING_FLOAT, MISSING_INT, MISSING_INT64};
pub use table::{IodaVars, REFERENCE_EPOCH};
pub use time::{to_epoch_seconds, CalendarTime, TimeRangeError};
