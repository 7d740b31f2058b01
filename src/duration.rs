//! Expiry duration parsing
//!
//! Parses the compact `<integer><unit>` form accepted by `--expires`, e.g.
//! `30`, `45s`, `10m`, `2h`, `1d`, `1w`, `1y`. A bare integer is seconds.

use std::time::Duration;

/// Seconds per unit suffix. A year is 365 days.
const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * 60;
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
const SECONDS_PER_WEEK: u64 = 7 * 24 * 60 * 60;
const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// Parses a duration string of the form `<integer><unit>`.
///
/// Returns `None` for an empty string, an unknown unit, or a non-integer
/// magnitude. Callers turn `None` into their own error type.
pub fn parse_duration(s: &str) -> Option<Duration> {
    if s.is_empty() {
        return None;
    }

    let (magnitude, unit) = match s.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => s.split_at(idx),
        None => (s, ""),
    };

    let magnitude: u64 = magnitude.parse().ok()?;
    let per_unit = match unit {
        "" | "s" => 1,
        "m" => SECONDS_PER_MINUTE,
        "h" => SECONDS_PER_HOUR,
        "d" => SECONDS_PER_DAY,
        "w" => SECONDS_PER_WEEK,
        "y" => SECONDS_PER_YEAR,
        _ => return None,
    };

    Some(Duration::from_secs(magnitude.checked_mul(per_unit)?))
}
