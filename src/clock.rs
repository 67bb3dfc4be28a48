//! Wall-clock timestamps and the delay helper used to schedule module handoffs.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use utoipa::ToSchema;

/// Absolute wall-clock instant, in milliseconds since the Unix epoch.
///
/// Display clients agree on this representation, so deadlines travel over the wire
/// as plain integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Build a timestamp from milliseconds since the Unix epoch.
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Milliseconds since the Unix epoch.
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Shift the timestamp by `delta`, saturating on overflow.
    pub fn saturating_add(self, delta: Duration) -> Self {
        let delta = i64::try_from(delta.as_millis()).unwrap_or(i64::MAX);
        Self(self.0.saturating_add(delta))
    }

    /// Shift the timestamp backwards by `delta`, saturating on overflow.
    pub fn saturating_sub(self, delta: Duration) -> Self {
        let delta = i64::try_from(delta.as_millis()).unwrap_or(i64::MAX);
        Self(self.0.saturating_sub(delta))
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(value: OffsetDateTime) -> Self {
        let millis = value.unix_timestamp_nanos() / 1_000_000;
        Self(i64::try_from(millis).unwrap_or(i64::MAX))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = OffsetDateTime::from_unix_timestamp_nanos(i128::from(self.0) * 1_000_000)
            .ok()
            .and_then(|datetime| datetime.format(&Rfc3339).ok());
        match formatted {
            Some(text) => f.write_str(&text),
            None => write!(f, "{}ms", self.0),
        }
    }
}

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Timestamp;
}

/// [`Clock`] backed by the operating system's real-time clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        OffsetDateTime::now_utc().into()
    }
}

/// Delay from `now` until `deadline`, clamped to zero for deadlines already in the past.
pub fn until(deadline: Timestamp, now: Timestamp) -> Duration {
    let remaining = deadline.as_millis().saturating_sub(now.as_millis());
    Duration::from_millis(u64::try_from(remaining).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn until_future_deadline_returns_remaining_time() {
        let now = Timestamp::from_millis(10_000);
        let deadline = Timestamp::from_millis(12_500);
        assert_eq!(until(deadline, now), Duration::from_millis(2_500));
    }

    #[test]
    fn until_past_deadline_is_clamped_to_zero() {
        let now = Timestamp::from_millis(10_000);
        assert_eq!(until(Timestamp::from_millis(9_900), now), Duration::ZERO);
        assert_eq!(until(now, now), Duration::ZERO);
    }

    #[test]
    fn saturating_arithmetic_does_not_wrap() {
        let ts = Timestamp::from_millis(i64::MAX - 1);
        assert_eq!(
            ts.saturating_add(Duration::from_secs(1)),
            Timestamp::from_millis(i64::MAX)
        );
        assert_eq!(
            Timestamp::from_millis(1_000).saturating_sub(Duration::from_millis(400)),
            Timestamp::from_millis(600)
        );
    }

    #[test]
    fn display_formats_as_rfc3339() {
        let ts = Timestamp::from_millis(0);
        assert_eq!(ts.to_string(), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn serializes_as_plain_integer() {
        let json = serde_json::to_string(&Timestamp::from_millis(1_234)).unwrap();
        assert_eq!(json, "1234");
    }
}
