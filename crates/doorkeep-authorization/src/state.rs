//! Actor open-state store

use crate::effects::AccessEffects;
use doorkeep_core::effects::StateFilter;
use doorkeep_core::{is_active_at, open_pulse, AccessResult, ActorState, IdentityId};

/// Writes open pulses and evaluates whether an actor is open
#[derive(Debug, Clone)]
pub struct StateStore {
    effects: AccessEffects,
}

impl StateStore {
    /// Store over the given effects
    pub fn new(effects: AccessEffects) -> Self {
        Self { effects }
    }

    /// Append an open pulse for `actor` starting now
    pub async fn open_pulse(&self, actor: IdentityId) -> AccessResult<ActorState> {
        let state = ActorState::pulse(actor, self.effects.clock.now(), open_pulse())?;
        self.effects.repository.insert_state(state.clone()).await?;
        tracing::debug!(actor = %actor, begin = ?state.begin, end = ?state.end, "open pulse stored");
        Ok(state)
    }

    /// Whether any stored interval of `actor` covers the current instant
    pub async fn is_open(&self, actor: IdentityId) -> AccessResult<bool> {
        let states = self
            .effects
            .repository
            .select_states(&StateFilter::for_actor(actor))
            .await?;
        let intervals: Vec<_> = states.iter().map(ActorState::interval).collect();
        Ok(is_active_at(&intervals, self.effects.clock.now()))
    }

    /// Maintenance hook over stored intervals.
    ///
    /// No retention policy exists yet, so nothing is removed.
    pub async fn sanitize(&self) -> AccessResult<()> {
        tracing::debug!(at = %self.effects.clock.now(), "state sanitation pass (no-op)");
        Ok(())
    }
}
