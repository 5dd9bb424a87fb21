//! Sanitation schedules
//!
//! [`EveryNthCall`] samples the hook with a shared atomic counter. The counter
//! is best-effort: relaxed ordering, no lock, and the occasional duplicate or
//! missed run under contention is acceptable.

use doorkeep_core::effects::SanitationSchedule;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default sampling modulus
pub const DEFAULT_MODULUS: u64 = 100;

/// Fires on every `modulus`-th call
#[derive(Debug)]
pub struct EveryNthCall {
    counter: AtomicU64,
    modulus: u64,
}

impl EveryNthCall {
    /// Schedule firing once per `modulus` calls; a zero modulus is treated as one
    pub fn new(modulus: u64) -> Self {
        Self {
            counter: AtomicU64::new(0),
            modulus: modulus.max(1),
        }
    }

    /// Configured modulus
    pub fn modulus(&self) -> u64 {
        self.modulus
    }
}

impl Default for EveryNthCall {
    fn default() -> Self {
        Self::new(DEFAULT_MODULUS)
    }
}

impl SanitationSchedule for EveryNthCall {
    fn should_sanitize(&self) -> bool {
        let wrap = self.modulus.saturating_mul(1000);
        let previous = self
            .counter
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                Some(if n > wrap { 0 } else { n + 1 })
            })
            .unwrap_or(0);
        let current = if previous > wrap { 0 } else { previous + 1 };
        current % self.modulus == 0
    }
}

/// Never runs the hook
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverSanitize;

impl SanitationSchedule for NeverSanitize {
    fn should_sanitize(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_modulus() {
        let schedule = EveryNthCall::new(5);
        let fired: Vec<bool> = (0..10).map(|_| schedule.should_sanitize()).collect();
        assert_eq!(fired.iter().filter(|f| **f).count(), 2);
        assert!(fired[4]);
        assert!(fired[9]);
    }

    #[test]
    fn modulus_one_always_fires() {
        let schedule = EveryNthCall::new(0);
        assert_eq!(schedule.modulus(), 1);
        assert!((0..3).all(|_| schedule.should_sanitize()));
    }

    #[test]
    fn never_is_never() {
        assert!(!(0..1000).any(|_| NeverSanitize.should_sanitize()));
    }
}
