//! System clock handler

use chrono::Utc;
use doorkeep_core::effects::ClockEffects;
use doorkeep_core::Timestamp;

/// Real time handler for production use
///
/// Stateless; delegates to the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealClockHandler;

impl RealClockHandler {
    /// Create a new real clock handler
    pub fn new() -> Self {
        Self
    }
}

impl ClockEffects for RealClockHandler {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}
