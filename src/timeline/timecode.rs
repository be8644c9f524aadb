use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::TimelineError;

// @module: Conversion between seconds and subtitle timestamps

// @const: Timestamp pattern, hour field may be wider than two digits
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2}),(\d{3})$").unwrap()
});

/// Format seconds as `HH:MM:SS,mmm`.
///
/// Every field is truncated, never rounded, so the output matches what other
/// subtitle tools produce for the same value. Negative or non-finite input is
/// treated as zero.
pub fn encode(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };

    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let millis = (((seconds - seconds.floor()) * 1000.0).floor() as u64).min(999);

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Parse an `H+:MM:SS,mmm` timestamp into seconds
pub fn decode(timestamp: &str) -> Result<f64, TimelineError> {
    let trimmed = timestamp.trim();
    let caps = TIMESTAMP_REGEX
        .captures(trimmed)
        .ok_or_else(|| TimelineError::MalformedTimestamp(timestamp.to_string()))?;

    let field = |idx: usize| -> Result<u64, TimelineError> {
        caps.get(idx)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .ok_or_else(|| TimelineError::MalformedTimestamp(timestamp.to_string()))
    };

    let hours = field(1)?;
    let minutes = field(2)?;
    let secs = field(3)?;
    let millis = field(4)?;

    // Whole milliseconds first, so every decoded value is exactly `n / 1000`
    let total_millis = hours
        .checked_mul(3_600_000)
        .and_then(|h| h.checked_add(minutes * 60_000 + secs * 1000 + millis))
        .ok_or_else(|| TimelineError::MalformedTimestamp(timestamp.to_string()))?;
    Ok(total_millis as f64 / 1000.0)
}
