//! Scheduling of the actor-state sanitation hook.
//!
//! The orchestrator asks the schedule on each state query whether to run the
//! hook. Occasional double runs or skipped runs are acceptable.

use std::sync::Arc;

/// Decides when the sanitation hook runs
pub trait SanitationSchedule: Send + Sync {
    /// Called once per state query; `true` means run the hook now
    fn should_sanitize(&self) -> bool;
}

impl<T: SanitationSchedule + ?Sized> SanitationSchedule for Arc<T> {
    fn should_sanitize(&self) -> bool {
        (**self).should_sanitize()
    }
}
