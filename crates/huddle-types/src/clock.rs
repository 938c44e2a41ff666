//! Wall-clock access and timestamp helpers.
//!
//! Records carry zoned timestamps ([`Timestamp`]) so that an event created
//! as "19:00 +09:00" reads back with the same offset. Comparisons between
//! timestamps are by instant, regardless of offset.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};

use crate::error::TypeError;

/// A point in time with the UTC offset it was expressed in.
pub type Timestamp = DateTime<FixedOffset>;

/// Source of the current time.
///
/// Services take a clock instead of calling [`Utc::now`] directly so that
/// "must be in the future" checks are deterministic under test.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

/// The real wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().fixed_offset()
    }
}

/// A clock frozen at a single instant.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Timestamp);

impl FixedClock {
    /// Freeze the clock at the given instant.
    pub fn at(instant: Timestamp) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

impl fmt::Debug for FixedClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedClock({})", self.0.to_rfc3339())
    }
}

/// Parse an RFC 3339 timestamp such as `2026-11-02T19:00:00+09:00`.
pub fn parse_timestamp(input: &str) -> Result<Timestamp, TypeError> {
    DateTime::parse_from_rfc3339(input.trim()).map_err(|e| TypeError::InvalidTimestamp {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_offset() {
        let ts = parse_timestamp("2026-11-02T19:00:00+09:00").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(ts.to_rfc3339(), "2026-11-02T19:00:00+09:00");
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = parse_timestamp("next tuesday").unwrap_err();
        assert!(matches!(err, TypeError::InvalidTimestamp { .. }));
    }

    #[test]
    fn comparison_is_by_instant() {
        let tokyo = parse_timestamp("2026-11-02T19:00:00+09:00").unwrap();
        let utc = parse_timestamp("2026-11-02T10:00:00Z").unwrap();
        assert_eq!(tokyo, utc);
    }

    #[test]
    fn fixed_clock_is_frozen() {
        let instant = parse_timestamp("2026-01-01T00:00:00Z").unwrap();
        let clock = FixedClock::at(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn system_clock_moves_forward() {
        let a = SystemClock.now();
        let b = SystemClock.now();
        assert!(b >= a);
    }
}
