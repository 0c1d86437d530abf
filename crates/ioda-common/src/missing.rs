//! Missing-value conventions of the IODA observation format.

/// Fill value for unset float cells.
pub const MISSING_FLOAT: f32 = -3.368_795_3e38;

/// Fill value for unset integer cells.
pub const MISSING_INT: i32 = -2_147_483_643;

/// Fill value for unset datetimes held in memory as f64 epoch seconds.
///
/// This is the float fill widened to f64. IODA stores `dateTime` as int64
/// with its own fill, [`MISSING_INT64`]; convert with [`datetime_to_int64`].
pub const MISSING_DATETIME: f64 = MISSING_FLOAT as f64;

/// Fill value for unset int64 cells, including IODA `dateTime`.
pub const MISSING_INT64: i64 = -9_223_372_036_854_775_806;

/// Returns true if a float equals the missing-value sentinel.
pub fn is_missing_float(value: f32) -> bool {
    value == MISSING_FLOAT
}

/// Epoch seconds as IODA's int64 `dateTime`; the f64 fill maps to [`MISSING_INT64`].
pub fn datetime_to_int64(seconds: f64) -> i64 {
    if seconds == MISSING_DATETIME || !seconds.is_finite() {
        MISSING_INT64
    } else {
        seconds as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_float_detection() {
        assert!(is_missing_float(MISSING_FLOAT));
        assert!(!is_missing_float(0.0));
        assert!(!is_missing_float(f32::NAN));
    }

    #[test]
    fn test_missing_datetime_matches_float() {
        assert_eq!(MISSING_DATETIME as f32, MISSING_FLOAT);
    }

    #[test]
    fn test_datetime_to_int64() {
        assert_eq!(datetime_to_int64(1_709_232_312.0), 1_709_232_312);
        assert_eq!(datetime_to_int64(0.0), 0);
        assert_eq!(datetime_to_int64(MISSING_DATETIME), MISSING_INT64);
        assert_eq!(datetime_to_int64(f64::NAN), MISSING_INT64);
    }
}
