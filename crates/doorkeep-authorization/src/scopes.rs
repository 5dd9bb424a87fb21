//! Scope registry
//!
//! Append-only grants of (holder, actor, mode). A check succeeds if any row
//! matches, so duplicate grants are harmless.

use crate::effects::AccessEffects;
use doorkeep_core::effects::ScopeFilter;
use doorkeep_core::{AccessResult, IdentityId, Mode, Scope, ScopeId};

/// Stores and answers scope grants
#[derive(Debug, Clone)]
pub struct ScopeRegistry {
    effects: AccessEffects,
}

impl ScopeRegistry {
    /// Registry over the given effects
    pub fn new(effects: AccessEffects) -> Self {
        Self { effects }
    }

    /// Record that `grantor` may perform `mode` on `actor`
    pub async fn grant(
        &self,
        grantor: IdentityId,
        actor: IdentityId,
        mode: Mode,
    ) -> AccessResult<ScopeId> {
        let now = self.effects.clock.now();
        let scope = Scope {
            id: ScopeId::new_random(),
            grantor_id: grantor,
            actor_id: actor,
            mode,
            created_at: now,
            updated_at: now,
        };
        let id = scope.id;
        self.effects.repository.insert_scope(scope).await?;
        tracing::info!(grantor = %grantor, actor = %actor, %mode, "scope granted");
        Ok(id)
    }

    /// Whether `subject` holds `mode` on `actor`
    pub async fn has_mode(
        &self,
        subject: IdentityId,
        actor: IdentityId,
        mode: Mode,
    ) -> AccessResult<bool> {
        let rows = self
            .effects
            .repository
            .select_scopes(&ScopeFilter::exact(subject, actor, mode))
            .await?;
        Ok(rows.iter().any(|scope| scope.grants(subject, actor, mode)))
    }

    /// Every scope held by `subject`
    pub async fn held_by(&self, subject: IdentityId) -> AccessResult<Vec<Scope>> {
        Ok(self
            .effects
            .repository
            .select_scopes(&ScopeFilter::held_by(subject))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::effects;

    #[tokio::test]
    async fn modes_are_not_interchangeable() {
        let (fx, _clock) = effects();
        let registry = ScopeRegistry::new(fx);
        let (user, actor) = (IdentityId::new_random(), IdentityId::new_random());
        registry.grant(user, actor, Mode::Read).await.unwrap();

        assert!(registry.has_mode(user, actor, Mode::Read).await.unwrap());
        assert!(!registry.has_mode(user, actor, Mode::Write).await.unwrap());
        assert!(!registry.has_mode(actor, user, Mode::Read).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_grants_are_harmless() {
        let (fx, _clock) = effects();
        let registry = ScopeRegistry::new(fx);
        let (user, actor) = (IdentityId::new_random(), IdentityId::new_random());
        registry.grant(user, actor, Mode::Write).await.unwrap();
        registry.grant(user, actor, Mode::Write).await.unwrap();

        assert!(registry.has_mode(user, actor, Mode::Write).await.unwrap());
        assert_eq!(registry.held_by(user).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unset_mode_grants_nothing_else() {
        let (fx, _clock) = effects();
        let registry = ScopeRegistry::new(fx);
        let (user, actor) = (IdentityId::new_random(), IdentityId::new_random());
        registry.grant(user, actor, Mode::Unset).await.unwrap();
        assert!(!registry.has_mode(user, actor, Mode::Read).await.unwrap());
        assert!(!registry.has_mode(user, actor, Mode::Write).await.unwrap());
    }
}
