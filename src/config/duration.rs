//! Duration strings in the `time.ParseDuration` grammar.
//!
//! The cooldown is configured as text (`"1m"`, `"90s"`, `"1h30m"`, `"1.5s"`),
//! so the parser accepts a sequence of decimal numbers, each followed by one
//! of `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A bare `"0"` is allowed.
//! Negative durations are rejected since a cooldown cannot run backwards.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Errors produced while parsing a duration string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("empty duration string")]
    Empty,

    #[error("negative duration {0:?}")]
    Negative(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("invalid number in duration {0:?}")]
    InvalidNumber(String),

    #[error("duration {0:?} overflows")]
    Overflow(String),
}

/// A `std::time::Duration` that round-trips through its textual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GoDuration(Duration);

impl GoDuration {
    pub fn as_std(&self) -> Duration {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Duration> for GoDuration {
    fn from(d: Duration) -> Self {
        Self(d)
    }
}

impl From<GoDuration> for Duration {
    fn from(d: GoDuration) -> Self {
        d.0
    }
}

impl FromStr for GoDuration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s).map(Self)
    }
}

impl fmt::Display for GoDuration {
    /// Formats as `1h2m3.5s`, `250ms` or `0s`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.0;
        if total.is_zero() {
            return write!(f, "0s");
        }
        if total < Duration::from_secs(1) {
            let nanos = total.subsec_nanos();
            return if nanos % 1_000_000 == 0 {
                write!(f, "{}ms", nanos / 1_000_000)
            } else if nanos % 1_000 == 0 {
                write!(f, "{}us", nanos / 1_000)
            } else {
                write!(f, "{}ns", nanos)
            };
        }

        let secs = total.as_secs();
        let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
        if hours > 0 {
            write!(f, "{}h", hours)?;
        }
        if hours > 0 || minutes > 0 {
            write!(f, "{}m", minutes)?;
        }
        let nanos = total.subsec_nanos();
        if nanos == 0 {
            write!(f, "{}s", seconds)
        } else {
            let frac = format!("{:09}", nanos);
            write!(f, "{}.{}s", seconds, frac.trim_end_matches('0'))
        }
    }
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(1_000_000_000),
        "m" => Some(60 * 1_000_000_000),
        "h" => Some(3_600 * 1_000_000_000),
        _ => None,
    }
}

/// Parse a duration string such as `"1m"` or `"2h45m30.5s"`.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let mut rest = input.trim();
    if rest.is_empty() {
        return Err(DurationParseError::Empty);
    }
    if let Some(stripped) = rest.strip_prefix('-') {
        if stripped.chars().any(|c| c != '0' && c != '.' && !c.is_alphabetic()) {
            return Err(DurationParseError::Negative(input.to_string()));
        }
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(DurationParseError::InvalidNumber(input.to_string()));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (int_part, after_int) = rest.split_at(int_len);

        let (frac_part, after_num) = match after_int.strip_prefix('.') {
            Some(after_dot) => {
                let frac_len = after_dot
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(after_dot.len());
                after_dot.split_at(frac_len)
            }
            None => ("", after_int),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(DurationParseError::InvalidNumber(input.to_string()));
        }

        let unit_len = after_num
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_num.len());
        let (unit, remaining) = after_num.split_at(unit_len);
        if unit.is_empty() {
            return Err(DurationParseError::MissingUnit(input.to_string()));
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationParseError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let overflow = || DurationParseError::Overflow(input.to_string());
        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| overflow())?
        };
        let mut amount = whole.checked_mul(scale).ok_or_else(overflow)?;

        // Digits beyond nanosecond precision cannot contribute.
        let frac_digits = &frac_part[..frac_part.len().min(18)];
        if !frac_digits.is_empty() {
            let frac: u128 = frac_digits
                .parse()
                .map_err(|_| DurationParseError::InvalidNumber(input.to_string()))?;
            amount += frac * scale / 10u128.pow(frac_digits.len() as u32);
        }

        total = total.checked_add(amount).ok_or_else(overflow)?;
        rest = remaining;
    }

    // Same ceiling as Go: an int64 count of nanoseconds (about 2562047h).
    if total > i64::MAX as u128 {
        return Err(DurationParseError::Overflow(input.to_string()));
    }
    let secs = (total / 1_000_000_000) as u64;
    Ok(Duration::new(secs, (total % 1_000_000_000) as u32))
}

/// Serde adapter for fields holding a [`GoDuration`] written as text.
pub mod serde_go {
    use super::GoDuration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &GoDuration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(d)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<GoDuration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
