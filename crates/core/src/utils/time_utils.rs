//! Date helpers for ledger post dates and watermarks.

use chrono::{DateTime, NaiveDate};

/// Fixed-width format used for every persisted watermark.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Normalizes a ledger date to its calendar day.
///
/// Accepts plain `YYYY-MM-DD`, RFC 3339 timestamps (reduced to the date in
/// their own offset) and `YYYY-MM-DD` followed by a `T` or space separated
/// time. Anything else yields `None`.
pub fn normalize_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.date_naive());
    }

    let prefix = value.get(..10)?;
    match value.as_bytes().get(10) {
        None | Some(b'T') | Some(b' ') => {}
        Some(_) => return None,
    }
    NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
