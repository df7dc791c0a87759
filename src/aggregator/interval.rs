//! Parsing of operator-supplied polling intervals.

use std::time::Duration;

use crate::{BlogoError, Result};

/// Nanoseconds per unit suffix.
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("us", 1e3),
    ("µs", 1e3),
    ("μs", 1e3),
    ("ms", 1e6),
    ("s", 1e9),
    ("m", 60.0 * 1e9),
    ("h", 3600.0 * 1e9),
];

/// Parse a duration such as `"1m"`, `"30s"`, `"1h30m"`, `"500ms"` or `"1.5h"`.
///
/// Every number needs a unit. The result must be greater than zero.
pub fn parse_interval(s: &str) -> Result<Duration> {
    let invalid = || BlogoError::Config(format!("invalid interval \"{s}\""));

    let input = s.trim();
    if input.starts_with('-') {
        return Err(BlogoError::Config(format!(
            "interval \"{s}\" must be positive"
        )));
    }
    let mut rest = input.strip_prefix('+').unwrap_or(input);
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total_nanos = 0.0_f64;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, after) = rest.split_at(number_len);
        if !number.chars().any(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let value: f64 = number.parse().map_err(|_| invalid())?;

        let unit_len = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_len);
        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| {
                if unit.is_empty() {
                    BlogoError::Config(format!("missing unit in interval \"{s}\""))
                } else {
                    BlogoError::Config(format!("unknown unit \"{unit}\" in interval \"{s}\""))
                }
            })?;

        total_nanos += value * scale;
        rest = after;
    }

    if !total_nanos.is_finite() || total_nanos >= u64::MAX as f64 {
        return Err(invalid());
    }
    let duration = Duration::from_nanos(total_nanos.round() as u64);
    if duration.is_zero() {
        return Err(BlogoError::Config(format!(
            "interval \"{s}\" must be positive"
        )));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_units() {
        assert_eq!(parse_interval("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_interval("1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_interval("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_interval("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_interval("250us").unwrap(), Duration::from_micros(250));
        assert_eq!(parse_interval("250µs").unwrap(), Duration::from_micros(250));
        assert_eq!(parse_interval("10ns").unwrap(), Duration::from_nanos(10));
    }

    #[test]
    fn test_parse_compound_and_fractional() {
        assert_eq!(parse_interval("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_interval("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_interval("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_interval(".5s").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_interval(" 10s ").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn test_parse_rejects_non_positive() {
        assert!(matches!(parse_interval("0s"), Err(BlogoError::Config(_))));
        assert!(matches!(parse_interval("-1m"), Err(BlogoError::Config(_))));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "abc", "10", "1x", "m", "1..5s", "1m-2s"] {
            assert!(
                matches!(parse_interval(input), Err(BlogoError::Config(_))),
                "{input:?} should be rejected"
            );
        }
    }
}
