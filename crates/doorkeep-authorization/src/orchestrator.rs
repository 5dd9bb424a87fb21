//! Authorization orchestrator
//!
//! Entry points that compose the registries into the per-request pipeline.
//! Every gate is a pure read; a failed gate returns before anything is
//! written. Mutations commit one statement at a time, so a failure while
//! recording usage leaves the primary effect in place.

use crate::credentials::CredentialStore;
use crate::effects::AccessEffects;
use crate::scopes::ScopeRegistry;
use crate::state::StateStore;
use crate::usage::UsageRecorder;
use crate::validity::ValidityRegistry;
use doorkeep_core::effects::SanitationSchedule;
use doorkeep_core::{AccessError, AccessResult, IdentityId, Mode, UsageType};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of a state query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateView {
    /// An open interval covers now
    Open,
    /// No open interval covers now
    Closed,
    /// Caller holds no read scope on the actor, or the actor does not exist
    NoPermission,
}

impl StateView {
    /// The boolean state, or `None` when the caller may not see it
    pub fn as_bool(self) -> Option<bool> {
        match self {
            StateView::Open => Some(true),
            StateView::Closed => Some(false),
            StateView::NoPermission => None,
        }
    }
}

/// Composes credentials, validity, scopes, state, and usage
#[derive(Clone)]
pub struct AccessOrchestrator {
    effects: AccessEffects,
    credentials: CredentialStore,
    validity: ValidityRegistry,
    scopes: ScopeRegistry,
    state: StateStore,
    usage: UsageRecorder,
    schedule: Arc<dyn SanitationSchedule>,
}

impl std::fmt::Debug for AccessOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessOrchestrator").finish_non_exhaustive()
    }
}

impl AccessOrchestrator {
    /// Orchestrator over `effects`, sampling the sanitation hook with `schedule`
    pub fn new(effects: AccessEffects, schedule: Arc<dyn SanitationSchedule>) -> Self {
        Self {
            credentials: CredentialStore::new(effects.clone()),
            validity: ValidityRegistry::new(effects.clone()),
            scopes: ScopeRegistry::new(effects.clone()),
            state: StateStore::new(effects.clone()),
            usage: UsageRecorder::new(effects.clone()),
            effects,
            schedule,
        }
    }

    /// Credential store sharing this orchestrator's effects
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Validity registry
    pub fn validity(&self) -> &ValidityRegistry {
        &self.validity
    }

    /// Scope registry
    pub fn scopes(&self) -> &ScopeRegistry {
        &self.scopes
    }

    /// Actor state store
    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Usage recorder
    pub fn usage(&self) -> &UsageRecorder {
        &self.usage
    }

    async fn require_valid(&self, caller: IdentityId) -> AccessResult<()> {
        if self.validity.is_valid(caller).await? {
            Ok(())
        } else {
            tracing::debug!(caller = %caller, "denied: caller not valid");
            Err(AccessError::NotValid { caller })
        }
    }

    /// Open `actor` for one pulse on behalf of `caller`.
    ///
    /// Requires a current validity window and a write scope. A read scope does
    /// not substitute.
    pub async fn set_state(&self, actor: IdentityId, caller: IdentityId) -> AccessResult<()> {
        self.require_valid(caller).await?;
        if !self.scopes.has_mode(caller, actor, Mode::Write).await? {
            tracing::debug!(caller = %caller, actor = %actor, "denied: no write scope");
            return Err(AccessError::NoScope {
                caller,
                actor,
                mode: Mode::Write,
            });
        }
        self.state.open_pulse(actor).await?;
        self.usage.record(caller, actor, UsageType::SetState).await?;
        tracing::info!(caller = %caller, actor = %actor, "actor opened");
        Ok(())
    }

    /// Query whether `actor` is open.
    ///
    /// The liveness heartbeat is refreshed before the scope check, so any
    /// valid caller polling an actor keeps it healthy. A missing read scope is
    /// reported as [`StateView::NoPermission`], which is also what a
    /// nonexistent actor yields.
    pub async fn get_state(
        &self,
        actor: IdentityId,
        caller: Option<IdentityId>,
    ) -> AccessResult<StateView> {
        let caller = caller.ok_or(AccessError::UnknownCaller)?;
        self.require_valid(caller).await?;

        if self.schedule.should_sanitize() {
            self.state.sanitize().await?;
        }

        self.usage
            .record(caller, actor, UsageType::LastGetState)
            .await?;

        if !self.scopes.has_mode(caller, actor, Mode::Read).await? {
            tracing::debug!(caller = %caller, actor = %actor, "denied: no read scope");
            return Ok(StateView::NoPermission);
        }

        if self.state.is_open(actor).await? {
            self.usage
                .record(caller, actor, UsageType::GetStateTrue)
                .await?;
            Ok(StateView::Open)
        } else {
            Ok(StateView::Closed)
        }
    }

    /// Whether `actor` polled its state within the last `timeout_secs` seconds
    pub async fn health_check(&self, actor: IdentityId, timeout_secs: i64) -> AccessResult<bool> {
        match self.credentials.identity(actor).await? {
            Some(identity) if identity.is_actor() => {}
            _ => return Err(AccessError::NotAnActor(actor)),
        }
        if timeout_secs <= 0 {
            return Err(AccessError::InvalidTimeout(timeout_secs));
        }
        let Some(last) = self.usage.latest(actor, UsageType::LastGetState).await? else {
            return Ok(false);
        };
        let age = self.effects.clock.now() - last;
        // A timeout beyond the representable range covers any age.
        Ok(chrono::Duration::try_seconds(timeout_secs).map_or(true, |limit| age <= limit))
    }
}
