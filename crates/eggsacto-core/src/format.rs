//! `m:ss` formatting for the remaining-time label.
//!
//! Hours are never rendered. The ruler caps durations at twenty minutes.

use std::time::Duration;

use crate::error::ValidationError;

/// Literal shown once the countdown has expired.
pub const ZERO_LABEL: &str = "0:00";

/// Format a non-negative number of seconds as `m:ss`.
///
/// Minutes are `floor(s / 60)` and unpadded; seconds are the floored
/// Euclidean remainder, zero-padded to two digits. Negative or NaN input is
/// treated as zero.
pub fn format_remaining(secs: f64) -> String {
    if secs.is_nan() || secs <= 0.0 {
        return ZERO_LABEL.to_string();
    }
    let minutes = (secs / 60.0).floor() as u64;
    let seconds = secs.rem_euclid(60.0).floor() as u64;
    format!("{minutes}:{seconds:02}")
}

/// Label for a countdown that is still running.
///
/// Rounds up to whole seconds, so the label reads `0:01` until the very end
/// and [`ZERO_LABEL`] only ever appears at expiry.
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining
        .as_secs()
        .saturating_add(u64::from(remaining.subsec_nanos() > 0));
    if secs == 0 {
        return ZERO_LABEL.to_string();
    }
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Parse an `m:ss` string back into a duration.
///
/// A bare integer is accepted as whole seconds.
pub fn parse_clock(input: &str) -> Result<Duration, ValidationError> {
    let trimmed = input.trim();
    let malformed = || ValidationError::MalformedClock {
        input: input.to_string(),
    };

    let Some((min, sec)) = trimmed.split_once(':') else {
        return trimmed
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| malformed());
    };

    if sec.len() != 2 {
        return Err(malformed());
    }
    let minutes: u64 = min.parse().map_err(|_| malformed())?;
    let seconds: u64 = sec.parse().map_err(|_| malformed())?;
    if seconds >= 60 {
        return Err(ValidationError::SecondsOutOfRange {
            input: input.to_string(),
        });
    }
    Ok(Duration::from_secs(minutes.saturating_mul(60) + seconds))
}
