//! Elapsed-time values with a compact text encoding
//!
//! Limits in the manifest are persisted as text such as `"30s"`, `"5m"` or
//! `"1h30m"`. Formatting emits the largest units first and omits zero
//! components, so a value always renders the same way. Parsing is more
//! lenient and accepts any sequence of `<decimal><unit>` pairs (`"5m0s"`,
//! `"1.5s"`), which keeps manifests written by other tooling readable.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;

/// Units in formatting order. Parsing matches the longest suffix first.
const UNITS: [(&str, u128); 6] = [
    ("h", NANOS_PER_HOUR),
    ("m", NANOS_PER_MINUTE),
    ("s", NANOS_PER_SECOND),
    ("ms", NANOS_PER_MILLI),
    ("us", NANOS_PER_MICRO),
    ("ns", 1),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid duration '{input}': {reason}")]
pub struct DurationParseError {
    input: String,
    reason: &'static str,
}

impl DurationParseError {
    fn new(input: &str, reason: &'static str) -> Self {
        DurationParseError {
            input: input.to_string(),
            reason,
        }
    }
}

/// A non-negative elapsed time that serializes as compact text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(pub std::time::Duration);

impl Duration {
    pub const ZERO: Duration = Duration(std::time::Duration::ZERO);

    pub const fn from_secs(secs: u64) -> Self {
        Duration(std::time::Duration::from_secs(secs))
    }

    pub const fn from_millis(millis: u64) -> Self {
        Duration(std::time::Duration::from_millis(millis))
    }

    pub const fn as_std(&self) -> std::time::Duration {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<std::time::Duration> for Duration {
    fn from(value: std::time::Duration) -> Self {
        Duration(value)
    }
}

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        value.0
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut remaining = self.0.as_nanos();
        if remaining == 0 {
            return f.write_str("0s");
        }

        for (suffix, nanos) in UNITS {
            let count = remaining / nanos;
            if count > 0 {
                write!(f, "{}{}", count, suffix)?;
                remaining -= count * nanos;
            }
        }
        Ok(())
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim();
        if text.is_empty() {
            return Err(DurationParseError::new(input, "empty value"));
        }
        if text == "0" {
            return Ok(Duration::ZERO);
        }
        if text.starts_with('-') {
            return Err(DurationParseError::new(input, "negative durations are not allowed"));
        }

        let mut total: u128 = 0;
        let mut rest = text.trim_start_matches('+');

        while !rest.is_empty() {
            let number_len = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(rest.len());
            if number_len == 0 {
                return Err(DurationParseError::new(input, "expected a number"));
            }
            let (number, tail) = rest.split_at(number_len);

            let unit_len = tail
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(tail.len());
            if unit_len == 0 {
                return Err(DurationParseError::new(input, "missing unit"));
            }
            let (unit, next) = tail.split_at(unit_len);

            let Some(unit_nanos) = unit_nanos(unit) else {
                return Err(DurationParseError::new(input, "unknown unit"));
            };

            let amount = scale(number, unit_nanos)
                .ok_or_else(|| DurationParseError::new(input, "malformed number"))?;
            total = total
                .checked_add(amount)
                .ok_or_else(|| DurationParseError::new(input, "value out of range"))?;
            rest = next;
        }

        let secs = u64::try_from(total / NANOS_PER_SECOND)
            .map_err(|_| DurationParseError::new(input, "value out of range"))?;
        let nanos = (total % NANOS_PER_SECOND) as u32;
        Ok(Duration(std::time::Duration::new(secs, nanos)))
    }
}

/// Nanoseconds per `unit`. Both micro signs (U+00B5, U+03BC) are accepted for `us`.
fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "\u{b5}s" | "\u{3bc}s" => Some(NANOS_PER_MICRO),
        _ => UNITS
            .iter()
            .find(|(suffix, _)| *suffix == unit)
            .map(|&(_, nanos)| nanos),
    }
}

/// Convert a decimal literal in a given unit to nanoseconds.
fn scale(number: &str, unit_nanos: u128) -> Option<u128> {
    let (whole, fraction) = match number.split_once('.') {
        Some((w, f)) => (w, f),
        None => (number, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.contains('.') {
        return None;
    }

    let whole_value: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().ok()?
    };
    let mut amount = whole_value.checked_mul(unit_nanos)?;

    if !fraction.is_empty() {
        // Digits beyond nanosecond precision cannot change the result.
        let digits = &fraction[..fraction.len().min(18)];
        let fraction_value: u128 = digits.parse().ok()?;
        let divisor = 10u128.checked_pow(digits.len() as u32)?;
        amount = amount.checked_add(fraction_value.checked_mul(unit_nanos)? / divisor)?;
    }
    Some(amount)
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
