use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Nanoseconds in one second.
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Point in time as integer nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from nanoseconds since the epoch.
    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Returns nanoseconds since the epoch.
    #[must_use]
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Converts a UTC date-time, failing outside the representable nanosecond range.
    pub fn from_datetime(value: DateTime<Utc>) -> AppResult<Self> {
        value
            .timestamp_nanos_opt()
            .map(Self)
            .ok_or_else(|| AppError::Validation(format!("timestamp '{value}' is out of range")))
    }

    /// Converts to a UTC date-time.
    #[must_use]
    pub fn to_datetime(self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }

    /// Adds a nanosecond offset, returning `None` on overflow.
    #[must_use]
    pub fn checked_add_nanos(self, nanos: i64) -> Option<Self> {
        self.0.checked_add(nanos).map(Self)
    }
}

impl Display for Timestamp {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.to_datetime().to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::{NANOS_PER_SECOND, Timestamp};

    #[test]
    fn datetime_conversion_keeps_nanoseconds() {
        let timestamp = Timestamp::from_nanos(1_700_000_000 * NANOS_PER_SECOND + 42);
        let restored = Timestamp::from_datetime(timestamp.to_datetime());
        assert_eq!(restored, Ok(timestamp));
    }

    #[test]
    fn checked_add_detects_overflow() {
        assert!(Timestamp::from_nanos(i64::MAX).checked_add_nanos(1).is_none());
        assert_eq!(
            Timestamp::from_nanos(10).checked_add_nanos(5),
            Some(Timestamp::from_nanos(15))
        );
    }
}
