//! Per-account watermark arithmetic.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::DEFAULT_LOOKBACK_DAYS;
use crate::utils::time_utils::normalize_date;

/// Parses a persisted watermark. Values that are not a recognizable date are
/// treated as absent.
pub fn parse_stored(stored: Option<&str>) -> Option<NaiveDate> {
    stored.and_then(normalize_date)
}

/// Lower bound used for an account with no usable watermark. A lookback
/// that does not fit chrono's range falls back to `DEFAULT_LOOKBACK_DAYS`.
pub fn default_since(now: DateTime<Utc>, lookback_days: i64) -> NaiveDate {
    let back = |days: i64| {
        Duration::try_days(days.max(0)).and_then(|delta| now.checked_sub_signed(delta))
    };
    back(lookback_days)
        .or_else(|| back(DEFAULT_LOOKBACK_DAYS))
        .unwrap_or(now)
        .date_naive()
}

/// Date to fetch from: the stored watermark, or `lookback_days` before `now`.
pub fn resolve_since(stored: Option<&str>, now: DateTime<Utc>, lookback_days: i64) -> NaiveDate {
    parse_stored(stored).unwrap_or_else(|| default_since(now, lookback_days))
}

/// Watermark after observing `observed`. Never moves backwards and stays put
/// when nothing was observed.
pub fn advance(previous: Option<NaiveDate>, observed: Option<NaiveDate>) -> Option<NaiveDate> {
    match (previous, observed) {
        (Some(prev), Some(seen)) => Some(prev.max(seen)),
        (None, seen) => seen,
        (prev, None) => prev,
    }
}
