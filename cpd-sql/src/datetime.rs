//! Dates and times in the text form MySQL stores and compares.

use crate::error::{new_error, ErrorKind, Result};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The zero date MySQL uses for "no date".
pub const ZERO_DATE: &str = "0000-00-00";
pub const ZERO_TIME: &str = "0000-00-00 00:00:00";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// `YYYY-MM-DD` for `input`, or `ZERO_DATE` when there is no date.
///
/// `None`, the empty string and a zero date or time all mean no date.
pub fn date(input: Option<&str>) -> Result<String> {
    match input {
        Some(s) if !is_zero(s) => Ok(parse(s)?.format(DATE_FORMAT).to_string()),
        _ => Ok(ZERO_DATE.to_string()),
    }
}

/// `YYYY-MM-DD HH:MM:SS` for `input`, or `ZERO_TIME` when there is no date.
pub fn time(input: Option<&str>) -> Result<String> {
    match input {
        Some(s) if !is_zero(s) => Ok(parse(s)?.format(TIME_FORMAT).to_string()),
        _ => Ok(ZERO_TIME.to_string()),
    }
}

/// The local date of today.
pub fn today() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// The current local time.
pub fn now() -> String {
    Local::now().format(TIME_FORMAT).to_string()
}

fn is_zero(s: &str) -> bool {
    let s = s.trim();

    s.is_empty() || s == ZERO_DATE || s == ZERO_TIME
}

/// Reads a local date and time.
///
/// Accepts `now`, `today`, `tomorrow` and `yesterday` (the last three at
/// midnight), `@<unix seconds>`, RFC 3339, and `YYYY-MM-DD` optionally
/// followed by a time of day.
pub fn parse(input: &str) -> Result<NaiveDateTime> {
    let s = input.trim();
    let invalid = || new_error(ErrorKind::InvalidDate(input.to_string()));

    let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0).ok_or_else(invalid);

    match s.to_ascii_lowercase().as_str() {
        "now" => return Ok(Local::now().naive_local()),
        "today" => return midnight(Local::now().naive_local().date()),
        "tomorrow" => {
            return Local::now()
                .naive_local()
                .date()
                .succ_opt()
                .ok_or_else(invalid)
                .and_then(midnight)
        }
        "yesterday" => {
            return Local::now()
                .naive_local()
                .date()
                .pred_opt()
                .ok_or_else(invalid)
                .and_then(midnight)
        }
        _ => {}
    }

    if let Some(unix) = s.strip_prefix('@') {
        let secs: i64 = unix.parse().map_err(|_| invalid())?;

        return Utc
            .timestamp_opt(secs, 0)
            .single()
            .map(|t| t.with_timezone(&Local).naive_local())
            .ok_or_else(invalid);
    }

    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Local).naive_local());
    }

    for format in DATETIME_FORMATS.iter() {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(t);
        }
    }

    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| invalid())
        .and_then(midnight)
}
