//! Calendar-to-epoch conversion for per-scan observation times.
//!
//! Providers report scan times as six separate calendar components. The
//! observation table stores seconds since 1970-01-01T00:00:00Z instead.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Earliest year accepted from a provider file.
pub const MIN_YEAR: i32 = 1970;

/// Latest year accepted from a provider file.
pub const MAX_YEAR: i32 = 2100;

/// Out-of-range calendar component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeRangeError {
    #[error("Year {0} outside [1970, 2100]")]
    Year(i32),

    #[error("Invalid calendar date {year:04}-{month:02}-{day:02}")]
    Date { year: i32, month: u32, day: u32 },

    #[error("Invalid time of day {hour:02}:{minute:02}:{second:02}")]
    TimeOfDay { hour: u32, minute: u32, second: u32 },
}

/// One scan's time as reported by the provider, interpreted as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl CalendarTime {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Seconds since the Unix epoch.
    pub fn epoch_seconds(&self) -> Result<f64, TimeRangeError> {
        to_epoch_seconds(
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        )
    }
}

/// Convert UTC calendar components to whole seconds since 1970-01-01T00:00:00Z.
///
/// A leap second (`second == 60`) is clamped to 59, so the leap second and the
/// second before it share a timestamp. Years outside [`MIN_YEAR`, `MAX_YEAR`]
/// are rejected.
///
/// # Example
///
/// ```
/// use ioda_common::to_epoch_seconds;
///
/// assert_eq!(to_epoch_seconds(1970, 1, 1, 0, 0, 0).unwrap(), 0.0);
/// assert_eq!(to_epoch_seconds(1970, 1, 1, 0, 0, 60).unwrap(), 59.0);
/// ```
pub fn to_epoch_seconds(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Result<f64, TimeRangeError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(TimeRangeError::Year(year));
    }

    let second = if second == 60 { 59 } else { second };

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(TimeRangeError::Date { year, month, day })?;
    let datetime = date
        .and_hms_opt(hour, minute, second)
        .ok_or(TimeRangeError::TimeOfDay {
            hour,
            minute,
            second,
        })?;

    Ok(datetime.and_utc().timestamp() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_epoch_origin() {
        assert_eq!(to_epoch_seconds(1970, 1, 1, 0, 0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_leap_second_clamped() {
        assert_eq!(to_epoch_seconds(1970, 1, 1, 0, 0, 60).unwrap(), 59.0);
        assert_eq!(
            to_epoch_seconds(2016, 12, 31, 23, 59, 60).unwrap(),
            to_epoch_seconds(2016, 12, 31, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_matches_chrono_reference() {
        let expected = Utc
            .with_ymd_and_hms(2024, 2, 29, 18, 45, 12)
            .unwrap()
            .timestamp() as f64;
        assert_eq!(to_epoch_seconds(2024, 2, 29, 18, 45, 12).unwrap(), expected);
        assert_eq!(expected, 1_709_232_312.0);
    }

    #[test]
    fn test_year_out_of_range() {
        assert_eq!(
            to_epoch_seconds(1969, 12, 31, 23, 59, 59),
            Err(TimeRangeError::Year(1969))
        );
        assert_eq!(
            to_epoch_seconds(2101, 1, 1, 0, 0, 0),
            Err(TimeRangeError::Year(2101))
        );
    }

    #[test]
    fn test_invalid_date() {
        assert!(matches!(
            to_epoch_seconds(2023, 2, 29, 0, 0, 0),
            Err(TimeRangeError::Date { .. })
        ));
        assert!(matches!(
            to_epoch_seconds(2023, 13, 1, 0, 0, 0),
            Err(TimeRangeError::Date { .. })
        ));
        assert!(matches!(
            to_epoch_seconds(2023, 1, 0, 0, 0, 0),
            Err(TimeRangeError::Date { .. })
        ));
    }

    #[test]
    fn test_invalid_time_of_day() {
        assert!(matches!(
            to_epoch_seconds(2023, 1, 1, 24, 0, 0),
            Err(TimeRangeError::TimeOfDay { .. })
        ));
        assert!(matches!(
            to_epoch_seconds(2023, 1, 1, 0, 61, 0),
            Err(TimeRangeError::TimeOfDay { .. })
        ));
    }

    #[test]
    fn test_calendar_time_struct() {
        let t = CalendarTime::new(2000, 1, 1, 12, 0, 0);
        assert_eq!(t.epoch_seconds().unwrap(), 946_728_000.0);
    }
}
