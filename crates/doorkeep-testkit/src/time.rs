//! Controllable clock

use chrono::{Duration, TimeZone, Utc};
use doorkeep_core::effects::ClockEffects;
use doorkeep_core::Timestamp;
use parking_lot::Mutex;
use std::sync::Arc;

/// Instant on the fixed test day, 2024-02-20, in UTC
pub fn ts(hour: u32, minute: u32, second: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 2, 20, hour, minute, second)
        .single()
        .expect("valid wall-clock time")
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ControllableClock {
    current: Arc<Mutex<Timestamp>>,
}

impl ControllableClock {
    /// Clock frozen at `start`
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Jump to an absolute instant
    pub fn set(&self, now: Timestamp) {
        *self.current.lock() = now;
    }

    /// Move forward by `by`
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock();
        *current += by;
    }

    /// Current instant
    pub fn current(&self) -> Timestamp {
        *self.current.lock()
    }
}

impl Default for ControllableClock {
    fn default() -> Self {
        Self::new(ts(12, 0, 0))
    }
}

impl ClockEffects for ControllableClock {
    fn now(&self) -> Timestamp {
        self.current()
    }
}
