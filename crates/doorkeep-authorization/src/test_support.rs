//! Shared wiring for unit tests

use crate::effects::AccessEffects;
use doorkeep_core::Timestamp;
use doorkeep_effects::MemoryRepository;
use doorkeep_testkit::{ControllableClock, FastTestHasher, SequenceRandom};
use std::sync::Arc;

pub(crate) fn at(h: u32, m: u32, s: u32) -> Timestamp {
    doorkeep_testkit::ts(h, m, s)
}

/// Effects over an empty in-memory store; the clock handle drives time
pub(crate) fn effects() -> (AccessEffects, ControllableClock) {
    let clock = ControllableClock::new(at(12, 0, 0));
    let random = Arc::new(SequenceRandom::new(7));
    let effects = AccessEffects::new(
        Arc::new(MemoryRepository::new()),
        Arc::new(clock.clone()),
        random.clone(),
        Arc::new(FastTestHasher::new(random)),
    );
    (effects, clock)
}
