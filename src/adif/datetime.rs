//! Date/time normalization
//!
//! Turns the loose QSO_DATE / TIME_ON values found in exported logs into
//! ISO `YYYY-MM-DD` and `HH:MM:SS` strings. Anything that is not a real
//! calendar date or a valid time of day yields `None`.

use chrono::{NaiveDate, NaiveDateTime};

/// Keep only ASCII digits
fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize a time value to `HH:MM:SS`
///
/// Accepts the digits of the input (separators are ignored):
/// - 1 or 2 digits → hour only (`"9"` → `09:00:00`)
/// - 4 digits → HHMM
/// - 6 digits → HHMMSS
///
/// Any other digit count, or an out-of-range component, returns `None`.
pub fn normalize_time(time_str: &str) -> Option<String> {
    let clean = digits_only(time_str.trim());
    let (hh, mm, ss) = match clean.len() {
        1 | 2 => (clean.as_str(), "00", "00"),
        4 => (&clean[..2], &clean[2..4], "00"),
        6 => (&clean[..2], &clean[2..4], &clean[4..6]),
        _ => return None,
    };

    let hours: u32 = hh.parse().ok()?;
    let minutes: u32 = mm.parse().ok()?;
    let seconds: u32 = ss.parse().ok()?;
    if hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }
    Some(format!("{:02}:{:02}:{:02}", hours, minutes, seconds))
}

/// Normalize a date value to `YYYY-MM-DD`
///
/// Eight digits are read as YYYYMMDD (so `20230115` and `2023-01-15` both
/// work). Otherwise ISO date or date-time strings are tried.
pub fn normalize_date(date_str: &str) -> Option<String> {
    let trimmed = date_str.trim();
    let clean = digits_only(trimmed);

    if clean.len() == 8 {
        let year: i32 = clean[..4].parse().ok()?;
        let month: u32 = clean[4..6].parse().ok()?;
        let day: u32 = clean[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day)
            .map(|d| d.format("%Y-%m-%d").to_string());
    }

    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(d.format("%Y-%m-%d").to_string());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|dt| dt.date().format("%Y-%m-%d").to_string())
}

/// Combine a raw date and time into an ISO date-time (`YYYY-MM-DDTHH:MM:SS`)
pub fn combine(date_raw: &str, time_raw: &str) -> Option<String> {
    let date = normalize_date(date_raw)?;
    let time = normalize_time(time_raw)?;
    Some(format!("{}T{}", date, time))
}
