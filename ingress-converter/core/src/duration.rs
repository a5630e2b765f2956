use std::{fmt, str::FromStr, time::Duration};

/// A proxy timeout, written in annotations using Go's `time.Duration` format (e.g. `50s`,
/// `1m30s`, `500ms`).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timeout(Duration);

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ParseError {
    #[error("invalid unit: {}", EXPECTED_UNITS)]
    InvalidUnit,

    #[error("missing a unit: {}", EXPECTED_UNITS)]
    NoUnit,

    #[error("timeouts must not be negative")]
    Negative,

    #[error("timeout is too large")]
    Overflow,

    #[error("invalid floating-point number: {}", .0)]
    NotANumber(#[from] std::num::ParseFloatError),
}

const EXPECTED_UNITS: &str = "expected one of 'ns', 'us', '\u{00b5}s', 'ms', 's', 'm', or 'h'";

// === impl Timeout ===

impl Timeout {
    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    #[inline]
    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl From<Timeout> for Duration {
    fn from(Timeout(duration): Timeout) -> Self {
        duration
    }
}

impl fmt::Debug for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

/// Renders the timeout in the coarsest unit that represents it exactly, which is also how the
/// proxy expects it.
impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.0.as_millis();
        if self.0.subsec_nanos() % 1_000_000 != 0 {
            write!(f, "{}us", self.0.as_micros())
        } else if millis % 3_600_000 == 0 && millis > 0 {
            write!(f, "{}h", millis / 3_600_000)
        } else if millis % 60_000 == 0 && millis > 0 {
            write!(f, "{}m", millis / 60_000)
        } else if millis % 1_000 == 0 {
            write!(f, "{}s", millis / 1_000)
        } else {
            write!(f, "{millis}ms")
        }
    }
}

impl FromStr for Timeout {
    type Err = ParseError;

    /// Parses a sequence of `<number><unit>` segments, as Go's `time.ParseDuration` does. A bare
    /// `0` needs no unit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('-') {
            return Err(ParseError::Negative);
        }
        let s = s.strip_prefix('+').unwrap_or(s);
        if s == "0" {
            return Ok(Self(Duration::ZERO));
        }

        let mut rest = s;
        let mut total = Duration::ZERO;
        loop {
            let unit_start = rest.find(char::is_alphabetic).ok_or(ParseError::NoUnit)?;
            let (value, tail) = rest.split_at(unit_start);
            let unit_len = tail
                .find(|c: char| !c.is_alphabetic())
                .unwrap_or(tail.len());
            let (unit, tail) = tail.split_at(unit_len);

            let segment = scale(unit_of(unit)?, value.parse()?)?;
            total = total.checked_add(segment).ok_or(ParseError::Overflow)?;

            if tail.is_empty() {
                return Ok(Self(total));
            }
            rest = tail;
        }
    }
}

fn unit_of(unit: &str) -> Result<Duration, ParseError> {
    match unit {
        "ns" => Ok(Duration::from_nanos(1)),
        // U+00B5 is the micro sign, U+03BC the Greek letter mu.
        "us" | "\u{00b5}s" | "\u{03bc}s" => Ok(Duration::from_micros(1)),
        "ms" => Ok(Duration::from_millis(1)),
        "s" => Ok(Duration::from_secs(1)),
        "m" => Ok(Duration::from_secs(60)),
        "h" => Ok(Duration::from_secs(60 * 60)),
        _ => Err(ParseError::InvalidUnit),
    }
}

fn scale(unit: Duration, value: f64) -> Result<Duration, ParseError> {
    if value.is_sign_negative() {
        return Err(ParseError::Negative);
    }
    Duration::try_from_secs_f64(unit.as_secs_f64() * value).map_err(|_| ParseError::Overflow)
}
