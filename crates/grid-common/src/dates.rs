//! Julian day conversions for survey time stamps.

use chrono::{DateTime, Datelike, TimeZone, Utc};

use crate::{GridError, GridResult};

/// Julian day of the Unix epoch, 1970-01-01T00:00:00Z.
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Convert a Julian day to a UTC timestamp, rounded to the millisecond.
pub fn julian_day_to_datetime(jd: f64) -> GridResult<DateTime<Utc>> {
    if !jd.is_finite() {
        return Err(GridError::InvalidJulianDay(jd));
    }

    let millis = ((jd - UNIX_EPOCH_JD) * SECONDS_PER_DAY * 1000.0).round();
    if millis.abs() > i64::MAX as f64 {
        return Err(GridError::InvalidJulianDay(jd));
    }

    Utc.timestamp_millis_opt(millis as i64)
        .single()
        .ok_or(GridError::InvalidJulianDay(jd))
}

pub fn datetime_to_julian_day(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp_millis() as f64 / 1000.0 / SECONDS_PER_DAY + UNIX_EPOCH_JD
}

/// Format a Julian day as `YYYY-MM-DD HH:MM:SS.sss`.
pub fn format_iso(jd: f64) -> GridResult<String> {
    Ok(julian_day_to_datetime(jd)?
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string())
}

/// Earliest and latest calendar year present in a series of Julian days.
pub fn year_range(days: &[f64]) -> GridResult<Option<(i32, i32)>> {
    let mut range: Option<(i32, i32)> = None;

    for &jd in days {
        let year = julian_day_to_datetime(jd)?.year();
        range = Some(match range {
            None => (year, year),
            Some((lo, hi)) => (lo.min(year), hi.max(year)),
        });
    }

    Ok(range)
}
