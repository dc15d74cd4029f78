//! Timestamp parsing shared by request building and normalization

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp string into a UTC instant.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]±HH:MM`, naive datetimes and bare
/// dates. Values without an offset are interpreted in `zone` (UTC when `None`).
/// Returns `None` for anything else, including nonexistent local times.
pub fn parse_instant(input: &str, zone: Option<Tz>) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(input, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    match zone {
        None => Some(naive.and_utc()),
        Some(tz) => match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
            // Repeated wall-clock hour at a DST fall-back: take the earlier instant.
            LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
            LocalResult::None => None,
        },
    }
}

/// Interpret a number as milliseconds since the Unix epoch
pub fn instant_from_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() || millis.fract() != 0.0 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
}

/// Parse a timezone name such as `America/New_York`
pub fn parse_timezone(name: &str) -> Result<Tz, String> {
    name.parse::<Tz>()
        .map_err(|_| format!("unknown timezone '{name}'"))
}
