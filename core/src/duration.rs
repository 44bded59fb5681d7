//! Signed duration values with the `ns/us/ms/s/m/h` textual grammar.
//!
//! Duration flags accept a signed sequence of magnitude/unit pairs such as
//! `1h30m`, `-2.5s`, or `300ms`, and render back in the largest-unit-first
//! form (`1h30m0s`). The representation is a signed nanosecond count, so
//! negative durations round-trip.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

const NANOS_PER_US: i64 = 1_000;
const NANOS_PER_MS: i64 = 1_000_000;
const NANOS_PER_SEC: i64 = 1_000_000_000;
const NANOS_PER_MIN: i64 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: i64 = 60 * NANOS_PER_MIN;

/// A signed span of time with nanosecond resolution.
///
/// # Examples
///
/// ```
/// use cmdtree_core::Duration;
///
/// let d: Duration = "1h30m".parse().unwrap();
/// assert_eq!(d.to_string(), "1h30m0s");
///
/// let d: Duration = "-2.5s".parse().unwrap();
/// assert_eq!(d.as_nanos(), -2_500_000_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(i64);

impl Duration {
    /// A zero-length duration.
    pub const ZERO: Duration = Duration(0);

    /// Builds a duration from a signed nanosecond count.
    pub const fn from_nanos(nanos: i64) -> Self {
        Duration(nanos)
    }

    /// Builds a duration from a signed whole-second count.
    ///
    /// Saturates at the representable range.
    pub const fn from_secs(secs: i64) -> Self {
        Duration(secs.saturating_mul(NANOS_PER_SEC))
    }

    /// Returns the signed nanosecond count.
    pub const fn as_nanos(&self) -> i64 {
        self.0
    }

    /// Returns the duration in (possibly fractional, possibly negative)
    /// seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / NANOS_PER_SEC as f64
    }
}

fn unit_nanos(unit: &str) -> Option<i64> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_US),
        "ms" => Some(NANOS_PER_MS),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(NANOS_PER_MIN),
        "h" => Some(NANOS_PER_HOUR),
        _ => None,
    }
}

/// Parses a duration string.
///
/// The grammar is an optional sign followed by one or more
/// `<decimal[.fraction]><unit>` pairs, with units `ns`, `us` (or `µs`),
/// `ms`, `s`, `m`, and `h`. The bare string `0` (optionally signed) is also
/// accepted. Malformed text yields [`ValueError::Parse`]; magnitudes beyond
/// the representable range yield [`ValueError::Range`].
pub fn parse_duration(text: &str) -> Result<Duration, ValueError> {
    let mut s = text;
    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(ValueError::Parse);
    }

    let mut total: i128 = 0;
    while !s.is_empty() {
        let int_end = s
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(s.len());
        let (int_str, rest) = s.split_at(int_end);

        let (frac_str, rest) = match rest.strip_prefix('.') {
            Some(after_dot) => {
                let frac_end = after_dot
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(after_dot.len());
                after_dot.split_at(frac_end)
            }
            None => ("", rest),
        };

        if int_str.is_empty() && frac_str.is_empty() {
            return Err(ValueError::Parse);
        }

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let (unit_str, remainder) = rest.split_at(unit_end);
        let unit = unit_nanos(unit_str).ok_or(ValueError::Parse)?;

        let whole: u128 = if int_str.is_empty() {
            0
        } else {
            int_str.parse().map_err(|_| ValueError::Range)?
        };
        let mut pair: i128 = whole
            .checked_mul(unit as u128)
            .and_then(|n| i128::try_from(n).ok())
            .ok_or(ValueError::Range)?;

        if !frac_str.is_empty() {
            let frac: u128 = frac_str.parse().map_err(|_| ValueError::Range)?;
            let scale = 10u128
                .checked_pow(frac_str.len() as u32)
                .ok_or(ValueError::Range)?;
            // sub-nanosecond remainders truncate
            pair += (frac.checked_mul(unit as u128).ok_or(ValueError::Range)? / scale) as i128;
        }

        total = total.checked_add(pair).ok_or(ValueError::Range)?;
        if total > i64::MAX as i128 {
            return Err(ValueError::Range);
        }
        s = remainder;
    }

    let nanos = if negative { -(total as i64) } else { total as i64 };
    Ok(Duration(nanos))
}

// Renders fraction digits of `v` (scaled by 10^prec), dropping trailing
// zeros. Returns the remaining integer part.
fn fmt_frac(mut v: u64, prec: u32) -> (u64, String) {
    let mut out = String::new();
    let mut printing = false;
    for _ in 0..prec {
        let digit = (v % 10) as u8;
        printing = printing || digit != 0;
        if printing {
            out.insert(0, char::from(b'0' + digit));
        }
        v /= 10;
    }
    if printing {
        out.insert(0, '.');
    }
    (v, out)
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("0s");
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();

        if magnitude < NANOS_PER_US as u64 {
            write!(f, "{sign}{magnitude}ns")
        } else if magnitude < NANOS_PER_MS as u64 {
            let (int, frac) = fmt_frac(magnitude, 3);
            write!(f, "{sign}{int}{frac}µs")
        } else if magnitude < NANOS_PER_SEC as u64 {
            let (int, frac) = fmt_frac(magnitude, 6);
            write!(f, "{sign}{int}{frac}ms")
        } else {
            let (total_secs, frac) = fmt_frac(magnitude, 9);
            let secs = total_secs % 60;
            let mins = (total_secs / 60) % 60;
            let hours = total_secs / 3600;
            if hours > 0 {
                write!(f, "{sign}{hours}h{mins}m{secs}{frac}s")
            } else if mins > 0 {
                write!(f, "{sign}{mins}m{secs}{frac}s")
            } else {
                write!(f, "{sign}{secs}{frac}s")
            }
        }
    }
}

impl FromStr for Duration {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_units() {
        assert_eq!(parse_duration("300ns").unwrap().as_nanos(), 300);
        assert_eq!(parse_duration("2us").unwrap().as_nanos(), 2_000);
        assert_eq!(parse_duration("2µs").unwrap().as_nanos(), 2_000);
        assert_eq!(parse_duration("5ms").unwrap().as_nanos(), 5_000_000);
        assert_eq!(parse_duration("3s").unwrap().as_nanos(), 3 * NANOS_PER_SEC);
        assert_eq!(parse_duration("2m").unwrap().as_nanos(), 2 * NANOS_PER_MIN);
        assert_eq!(parse_duration("1h").unwrap().as_nanos(), NANOS_PER_HOUR);
    }

    #[test]
    fn test_parse_compound_and_fractional() {
        assert_eq!(
            parse_duration("1h30m").unwrap().as_nanos(),
            NANOS_PER_HOUR + 30 * NANOS_PER_MIN
        );
        assert_eq!(parse_duration("1.5s").unwrap().as_nanos(), 1_500_000_000);
        assert_eq!(
            parse_duration("1h0.5m").unwrap().as_nanos(),
            NANOS_PER_HOUR + 30 * NANOS_PER_SEC
        );
        assert_eq!(parse_duration(".5s").unwrap().as_nanos(), 500_000_000);
    }

    #[test]
    fn test_parse_signed_and_zero() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("-0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("-1h").unwrap().as_nanos(), -NANOS_PER_HOUR);
        assert_eq!(parse_duration("+2s").unwrap().as_nanos(), 2 * NANOS_PER_SEC);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_duration(""), Err(ValueError::Parse));
        assert_eq!(parse_duration("-"), Err(ValueError::Parse));
        assert_eq!(parse_duration("10"), Err(ValueError::Parse));
        assert_eq!(parse_duration("1d"), Err(ValueError::Parse));
        assert_eq!(parse_duration("s"), Err(ValueError::Parse));
        assert_eq!(parse_duration("1h 30m"), Err(ValueError::Parse));
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert_eq!(parse_duration("10000000000000000000h"), Err(ValueError::Range));
    }

    #[test]
    fn test_render_matches_canonical_forms() {
        assert_eq!(Duration::ZERO.to_string(), "0s");
        assert_eq!(Duration::from_nanos(100).to_string(), "100ns");
        assert_eq!(Duration::from_nanos(1_500).to_string(), "1.5µs");
        assert_eq!(Duration::from_nanos(2_000_000).to_string(), "2ms");
        assert_eq!(Duration::from_secs(90).to_string(), "1m30s");
        assert_eq!(Duration::from_secs(3600).to_string(), "1h0m0s");
        assert_eq!(Duration::from_secs(5400).to_string(), "1h30m0s");
        assert_eq!(Duration::from_nanos(-NANOS_PER_HOUR).to_string(), "-1h0m0s");
        assert_eq!(Duration::from_nanos(1_500_000_000).to_string(), "1.5s");
    }

    #[test]
    fn test_round_trip() {
        for text in ["1h30m0s", "1.5s", "100ns", "2ms", "-1h0m0s", "1.5µs"] {
            let parsed: Duration = text.parse().unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }
}
