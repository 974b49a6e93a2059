//! `createdAt` parsing and display.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Date-times carrying an offset. `%#z` takes `Z`, `+05:30`, `+0530` or `+05`.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
];

/// Date-times without an offset, taken as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a store timestamp into an instant.
///
/// Accepts RFC 3339 and other ISO-8601 date-times (seconds optional, offset
/// with or without a colon), naive date-times (taken as UTC), plain dates
/// (midnight UTC), and integer epoch milliseconds. Anything else yields
/// `None`.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(millis) = epoch_millis(raw) {
        return DateTime::<Utc>::from_timestamp_millis(millis);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// An optionally signed run of digits, read as milliseconds since the epoch.
fn epoch_millis(raw: &str) -> Option<i64> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Render a timestamp as `01 Jan 2024`, or `N/A` when absent or invalid.
pub fn display_date(raw: Option<&str>) -> String {
    raw.and_then(parse_instant)
        .map(|dt| dt.format("%d %b %Y").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}
