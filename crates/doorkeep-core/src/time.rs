//! Temporal validity evaluation
//!
//! Validity windows and actor open-state intervals share one rule: an instant is
//! covered if any non-vacuous interval contains it. Missing bounds stand for the
//! unbounded past and future. An interval whose end does not lie after its start
//! is inert; it is never an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// UTC wall-clock instant used throughout the store
pub type Timestamp = DateTime<Utc>;

/// Earliest instant substituted for a missing start bound
pub const TS_MIN: Timestamp = DateTime::<Utc>::MIN_UTC;

/// Latest instant substituted for a missing end bound
pub const TS_MAX: Timestamp = DateTime::<Utc>::MAX_UTC;

/// Time range with optional bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Inclusive start; `None` is the unbounded past
    pub start: Option<Timestamp>,
    /// Inclusive end; `None` is the unbounded future
    pub end: Option<Timestamp>,
}

impl Interval {
    /// Interval with both bounds given
    pub fn new(start: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        Self { start, end }
    }

    /// Interval covering all of time
    pub fn unbounded() -> Self {
        Self::new(None, None)
    }

    fn resolved(&self) -> (Timestamp, Timestamp) {
        (self.start.unwrap_or(TS_MIN), self.end.unwrap_or(TS_MAX))
    }

    /// True when the interval can never contain an instant
    pub fn is_vacuous(&self) -> bool {
        let (start, end) = self.resolved();
        end <= start
    }

    /// True when `now` lies within the interval, both ends inclusive
    pub fn contains(&self, now: Timestamp) -> bool {
        let (start, end) = self.resolved();
        if end <= start {
            return false;
        }
        start <= now && now <= end
    }
}

/// Decide whether any interval covers `now`.
///
/// Total and side-effect free. An empty input yields `false`.
pub fn is_active_at<'a, I>(intervals: I, now: Timestamp) -> bool
where
    I: IntoIterator<Item = &'a Interval>,
{
    intervals.into_iter().any(|interval| interval.contains(now))
}
