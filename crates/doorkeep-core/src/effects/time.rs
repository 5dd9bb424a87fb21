//! Wall-clock time effect.
//!
//! Every "now" in the access core comes from here so tests can pin it.

use crate::time::Timestamp;
use std::sync::Arc;

/// Source of the current UTC instant
pub trait ClockEffects: Send + Sync {
    /// Current UTC instant
    fn now(&self) -> Timestamp;
}

impl<T: ClockEffects + ?Sized> ClockEffects for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
