//! Time strings and simulated-time arithmetic.
//!
//! DRAM timings are given as strings such as `45ns`, `3.2us` or `32ms`. All
//! simulated time is kept in seconds as `f64`.

use crate::util::TIME_EPSILON_S;
use thiserror::Error;

/// Errors when parsing a time string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    /// No unit suffix and not a plain number.
    #[error("Invalid time format: '{0}'")]
    InvalidFormat(String),
    /// A unit suffix was found but the numeric part does not parse.
    #[error("Invalid numeric time: '{0}'")]
    InvalidNumber(String),
}

/// Parses a time string into seconds.
///
/// Accepts a decimal number with an optional, case-insensitive unit suffix
/// `ns`, `us` (or `µs`), `ms` or `s`. A bare number is taken as seconds.
///
/// # Examples
///
/// ```
/// use prac_core::util::parse_time;
///
/// assert_eq!(parse_time("64ms").unwrap(), 64e-3);
/// assert_eq!(parse_time("0.128").unwrap(), 0.128);
/// assert!(parse_time("fast").is_err());
/// ```
pub fn parse_time(s: &str) -> Result<f64, TimeParseError> {
    let s = s.trim().to_lowercase().replace("µs", "us");
    let unit = ["ns", "us", "ms", "s"]
        .into_iter()
        .find(|unit| s.ends_with(unit));
    let Some(unit) = unit else {
        return s
            .parse::<f64>()
            .map_err(|_| TimeParseError::InvalidFormat(s.clone()));
    };
    let value = s[..s.len() - unit.len()]
        .trim()
        .parse::<f64>()
        .map_err(|_| TimeParseError::InvalidNumber(s.clone()))?;
    Ok(match unit {
        "ns" => value * 1e-9,
        "us" => value * 1e-6,
        "ms" => value * 1e-3,
        _ => value,
    })
}

/// Formats seconds with the largest unit that keeps the value at or above one.
///
/// ```
/// use prac_core::util::human_time;
///
/// assert_eq!(human_time(45e-9), "45.000 ns");
/// assert_eq!(human_time(0.032), "32.000 ms");
/// assert_eq!(human_time(2.0), "2.000000 s");
/// ```
pub fn human_time(seconds: f64) -> String {
    let abs = seconds.abs();
    if abs >= 1.0 {
        format!("{seconds:.6} s")
    } else if abs >= 1e-3 {
        format!("{:.3} ms", seconds * 1e3)
    } else if abs >= 1e-6 {
        format!("{:.3} us", seconds * 1e6)
    } else {
        format!("{:.3} ns", seconds * 1e9)
    }
}

/// Whether two simulated timestamps are equal within [`TIME_EPSILON_S`].
pub fn time_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < TIME_EPSILON_S
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-15 * b.abs().max(1e-9)
    }

    #[test]
    fn parses_units() {
        assert!(close(parse_time("45ns").unwrap(), 45e-9));
        assert!(close(parse_time("3.2us").unwrap(), 3.2e-6));
        assert!(close(parse_time("3.2µs").unwrap(), 3.2e-6));
        assert!(close(parse_time("64ms").unwrap(), 64e-3));
        assert!(close(parse_time("0.001s").unwrap(), 1e-3));
        assert!(close(parse_time(" 410 NS ").unwrap(), 410e-9));
        assert_eq!(parse_time("0").unwrap(), 0.0);
        assert_eq!(parse_time("0us").unwrap(), 0.0);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            parse_time("abc"),
            Err(TimeParseError::InvalidFormat("abc".into()))
        );
        assert_eq!(
            parse_time("fastns"),
            Err(TimeParseError::InvalidNumber("fastns".into()))
        );
        assert!(parse_time("").is_err());
        assert!(parse_time("ms").is_err());
    }

    #[test]
    fn formats_units() {
        assert_eq!(human_time(0.0), "0.000 ns");
        assert_eq!(human_time(760e-9), "760.000 ns");
        assert_eq!(human_time(1e-6), "1.000 us");
        assert_eq!(human_time(1.5e-3), "1.500 ms");
        assert_eq!(human_time(1.0), "1.000000 s");
    }

    #[test]
    fn compares_with_tolerance() {
        assert!(time_eq(0.1 + 0.2, 0.3));
        assert!(!time_eq(10e-9, 11e-9));
    }
}
