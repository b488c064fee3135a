//! Date normalisation and display.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::frontmatter::RawDate;

/// Convert a front matter date into epoch milliseconds.
///
/// Accepted text forms are RFC 3339, RFC 2822, `YYYY-MM-DD` and
/// `YYYY-MM-DD[T ]HH:MM[:SS]`. Dates without an offset are read as UTC.
pub fn normalize_date(raw: &RawDate) -> Option<i64> {
    match raw {
        RawDate::Millis(ms) => Some(*ms),
        RawDate::Text(text) => parse_date(text).map(|dt| dt.timestamp_millis()),
    }
}

/// Parse a textual date.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Convert epoch milliseconds back to a UTC timestamp.
pub fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

/// Format a timestamp like `Jan. 1st 2023`.
pub fn format_human(ms: i64) -> String {
    let Some(dt) = from_millis(ms) else {
        return String::new();
    };
    let day = dt.day();
    format!("{}. {day}{} {}", dt.format("%b"), ordinal_suffix(day), dt.year())
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
