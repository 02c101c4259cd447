//! Wall-clock timestamps for membership expiry.
//!
//! The table never reads a clock itself; callers pass `now` into every
//! expiry check. `Timestamp::now()` exists for the daemon's sweeper.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Seconds plus nanoseconds since the Unix epoch.
///
/// Ordering is lexicographic on `(secs, nanos)`, which gives the expiry rule
/// directly: `now >= expiry` means expired, with the nanosecond field as
/// the tiebreak when seconds are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    secs: i64,
    nanos: u32,
}

impl Timestamp {
    /// Build a timestamp, carrying whole seconds out of `nanos`.
    pub fn new(secs: i64, nanos: u32) -> Self {
        Self {
            secs: secs.saturating_add(i64::from(nanos / NANOS_PER_SEC)),
            nanos: nanos % NANOS_PER_SEC,
        }
    }

    pub fn from_secs(secs: i64) -> Self {
        Self { secs, nanos: 0 }
    }

    pub fn now() -> Self {
        let now = Utc::now();
        Self::new(now.timestamp(), now.timestamp_subsec_nanos())
    }

    pub fn secs(&self) -> i64 {
        self.secs
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    /// This timestamp moved forward by whole seconds.
    pub fn after_secs(&self, secs: u64) -> Self {
        let delta = i64::try_from(secs).unwrap_or(i64::MAX);
        Self {
            secs: self.secs.saturating_add(delta),
            nanos: self.nanos,
        }
    }

    /// RFC 3339 rendering for monitoring output; `None` if out of chrono's range.
    pub fn to_rfc3339(&self) -> Option<String> {
        DateTime::<Utc>::from_timestamp(self.secs, self.nanos).map(|dt| dt.to_rfc3339())
    }
}
