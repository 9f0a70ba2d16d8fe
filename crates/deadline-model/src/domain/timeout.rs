use std::{num::NonZeroU64, str::FromStr, time::Duration};

use thiserror::Error;

/// Largest accepted deadline, in seconds.
///
/// Anything above cannot be added to a monotonic instant on every platform.
const MAX_SECONDS: u64 = u32::MAX as u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeoutParseError {
    #[error("invalid timeout '{0}': expected a whole number of seconds")]
    NotNumeric(String),
    #[error("timeout {0} doesn't make sense: must be at least 1 second")]
    NonPositive(i64),
    #[error("timeout {0} is too large (max {max} seconds)", max = MAX_SECONDS)]
    OutOfRange(u64),
}

/// Wall-clock deadline for the supervised command.
///
/// Always a positive number of whole seconds; immutable once parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    seconds: NonZeroU64,
}

impl TimeoutConfig {
    /// Builds a deadline from a number of seconds.
    pub fn from_secs(seconds: u64) -> Result<Self, TimeoutParseError> {
        if seconds > MAX_SECONDS {
            return Err(TimeoutParseError::OutOfRange(seconds));
        }
        NonZeroU64::new(seconds)
            .map(|seconds| Self { seconds })
            .ok_or(TimeoutParseError::NonPositive(0))
    }

    #[inline]
    pub fn seconds(&self) -> u64 {
        self.seconds.get()
    }

    /// Interval between two consecutive timer firings.
    #[inline]
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.seconds.get())
    }
}

impl FromStr for TimeoutConfig {
    type Err = TimeoutParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(seconds) = s.parse::<u64>() {
            return Self::from_secs(seconds);
        }
        match s.parse::<i64>() {
            Ok(negative) => Err(TimeoutParseError::NonPositive(negative)),
            Err(_) => Err(TimeoutParseError::NotNumeric(s.to_string())),
        }
    }
}
