//! Fully wired access service over an in-memory store

use crate::{ts, ControllableClock, FastTestHasher, SequenceRandom};
use doorkeep_authorization::{
    ensure_builtin_accounts, AccessApi, AccessEffects, AccessOrchestrator,
};
use doorkeep_core::{AccessResult, IdentityId, Mode, Role, Timestamp};
use doorkeep_effects::{EveryNthCall, MemoryRepository};
use std::sync::Arc;

const WORLD_SEED: u64 = 0x00d0_0c0d;

/// An identity created by the fixture together with its raw key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    /// Identity id
    pub id: IdentityId,
    /// Raw API key
    pub key: String,
}

impl Provisioned {
    /// The id as a request field
    pub fn id_str(&self) -> String {
        self.id.to_string()
    }
}

/// Seeded service with a controllable clock at 12:00:00 on the test day
pub struct World {
    /// Shared clock; move it to drive time
    pub clock: ControllableClock,
    /// Backing store
    pub repository: Arc<MemoryRepository>,
    /// Boundary under test
    pub api: AccessApi,
    /// Raw key of the seed admin
    pub admin_key: String,
    /// Raw key of the seed maintenance account
    pub maintenance_key: String,
}

impl World {
    /// Fresh world with both seed accounts in place
    pub async fn new() -> AccessResult<Self> {
        let clock = ControllableClock::new(ts(12, 0, 0));
        let repository = Arc::new(MemoryRepository::new());
        let random = Arc::new(SequenceRandom::new(WORLD_SEED));
        let effects = AccessEffects::new(
            repository.clone(),
            Arc::new(clock.clone()),
            random.clone(),
            Arc::new(FastTestHasher::new(random)),
        );
        let api = AccessApi::new(AccessOrchestrator::new(
            effects,
            Arc::new(EveryNthCall::default()),
        ));

        let seeded = ensure_builtin_accounts(api.orchestrator().credentials()).await?;
        // An empty store always yields both seed accounts.
        let key_for = |role: Role| {
            seeded
                .iter()
                .find(|account| account.role == role)
                .map(|account| account.api_key.clone())
                .expect("fresh store seeds every built-in account")
        };
        let admin_key = key_for(Role::Admin);
        let maintenance_key = key_for(Role::Maintenance);

        Ok(Self {
            clock,
            repository,
            api,
            admin_key,
            maintenance_key,
        })
    }

    /// Orchestrator behind the boundary
    pub fn orchestrator(&self) -> &AccessOrchestrator {
        self.api.orchestrator()
    }

    /// Identity with `role` and no validity windows
    pub async fn add_identity(&self, name: &str, role: Role) -> AccessResult<Provisioned> {
        let created = self
            .orchestrator()
            .credentials()
            .create_identity(name, role, None, None)
            .await?;
        Ok(Provisioned {
            id: created.id,
            key: created.api_key,
        })
    }

    /// Actor valid at all times, holding read scope on itself
    pub async fn add_actor(&self, name: &str) -> AccessResult<Provisioned> {
        let actor = self.add_identity(name, Role::Actor).await?;
        self.grant_validity(actor.id, None, None).await?;
        self.grant(actor.id, actor.id, Mode::Read).await?;
        Ok(actor)
    }

    /// User valid at all times, with no scopes
    pub async fn add_user(&self, name: &str) -> AccessResult<Provisioned> {
        let user = self.add_identity(name, Role::User).await?;
        self.grant_validity(user.id, None, None).await?;
        Ok(user)
    }

    /// Grant `mode` on `actor` to `holder`
    pub async fn grant(&self, holder: IdentityId, actor: IdentityId, mode: Mode) -> AccessResult<()> {
        self.orchestrator().scopes().grant(holder, actor, mode).await?;
        Ok(())
    }

    /// Add a validity window for `subject`
    pub async fn grant_validity(
        &self,
        subject: IdentityId,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
    ) -> AccessResult<()> {
        self.orchestrator()
            .validity()
            .grant(subject, start, end)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn world_starts_with_seed_accounts() {
        let world = World::new().await.unwrap();
        let credentials = world.orchestrator().credentials();
        assert!(credentials.is_admin(&world.admin_key).await.unwrap());
        assert!(!credentials.is_admin(&world.maintenance_key).await.unwrap());
        assert_ne!(world.admin_key, world.maintenance_key);
    }

    #[tokio::test]
    async fn provisioned_actor_can_poll_itself() {
        let world = World::new().await.unwrap();
        let door = world.add_actor("door").await.unwrap();
        let response = world
            .api
            .get_state(Some(&door.key), Some(&door.id_str()))
            .await
            .unwrap();
        assert!(!response.state);
    }
}
