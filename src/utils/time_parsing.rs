//! Time Normalization
//!
//! Converts swim times into canonical seconds (`f64`).
//!
//! Two parsing policies live here and stay separate:
//! - `parse_time_to_seconds`: user input. Strict; malformed input is an error.
//! - `convert_raw_time`: reference-table loading. Lenient; malformed input
//!   degrades to the `0.0` sentinel so one dirty row never blocks startup.

use crate::error::CheckError;

/// Sentinel time assigned to reference rows whose raw time could not be read
pub const SENTINEL_TIME: f64 = 0.0;

/// Parse a user-supplied time string into seconds
///
/// Accepted grammars:
/// 1. Bare seconds: digits with at most one `.` and no `:` ("1234", "34.56")
/// 2. Colon form "M:SS.cc": integer minutes, then seconds with optional fraction.
///    Result is `minutes * 60 + seconds`, rounded to 2 decimal places.
///
/// Anything else, including more than one `:`, is `InvalidTimeFormat`.
pub fn parse_time_to_seconds(raw: &str) -> Result<f64, CheckError> {
    let invalid = || CheckError::InvalidTimeFormat(raw.to_string());
    let trimmed = raw.trim();

    if !trimmed.contains(':') {
        if !is_decimal_literal(trimmed) {
            return Err(invalid());
        }
        return trimmed.parse::<f64>().map_err(|_| invalid());
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    let [minutes, seconds] = parts.as_slice() else {
        return Err(invalid());
    };
    let (minutes, seconds) = (minutes.trim(), seconds.trim());

    if minutes.is_empty() || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if !is_decimal_literal(seconds) {
        return Err(invalid());
    }

    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    let seconds: f64 = seconds.parse().map_err(|_| invalid())?;

    Ok(round_to_centiseconds(f64::from(minutes) * 60.0 + seconds))
}

/// Convert a raw reference-table time, degrading bad input to `SENTINEL_TIME`
///
/// Formats:
/// - "minutes.seconds.centiseconds" (three dot groups)
/// - "seconds.fraction" (two dot groups), read as a plain float
/// - a single group is read as a plain float of the whole text (".45" is 0.45)
///
/// A leading `.` is stripped before splitting into groups.
pub fn convert_raw_time(raw: &str) -> f64 {
    try_convert_raw_time(raw).unwrap_or(SENTINEL_TIME)
}

/// Same as `convert_raw_time` but reports failure as `None`
///
/// The loader uses this to log dirty rows before substituting the sentinel.
pub fn try_convert_raw_time(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let body = trimmed.strip_prefix('.').unwrap_or(trimmed);
    let parts: Vec<&str> = body.split('.').collect();

    let value = match parts.as_slice() {
        [minutes, seconds, centis] => {
            let minutes: f64 = minutes.trim().parse().ok()?;
            let seconds: f64 = seconds.trim().parse().ok()?;
            let centis: f64 = centis.trim().parse().ok()?;
            minutes * 60.0 + seconds + centis / 100.0
        }
        [_, _] => body.parse::<f64>().ok()?,
        _ => trimmed.parse::<f64>().ok()?,
    };

    value.is_finite().then_some(value)
}

/// Build the time string handed to `parse_time_to_seconds` from the input fields
///
/// Centiseconds are always two digits; minutes and seconds are not padded.
pub fn format_time_input(minutes: u32, seconds: u32, centiseconds: u32) -> String {
    format!("{}:{}.{:02}", minutes, seconds, centiseconds)
}

/// Round to 2 decimal places
pub fn round_to_centiseconds(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Digits with at most one `.`, and at least one digit
fn is_decimal_literal(s: &str) -> bool {
    let digits = s.bytes().filter(|b| b.is_ascii_digit()).count();
    let dots = s.bytes().filter(|&b| b == b'.').count();
    digits > 0 && dots <= 1 && digits + dots == s.len()
}
