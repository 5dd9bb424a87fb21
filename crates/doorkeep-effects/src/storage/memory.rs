//! In-memory repository

use async_trait::async_trait;
use doorkeep_core::effects::{
    IdentityFilter, IdentityUpdate, RepositoryEffects, ScopeFilter, StateFilter, UsageFilter,
    ValidityFilter,
};
use doorkeep_core::{
    ActorState, Identity, Scope, StorageError, Timestamp, UsageRecord, ValidityWindow,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// All stored collections
///
/// The methods are the synchronous statements every backend runs once it
/// holds the tables exclusively or shared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tables {
    /// Identities
    #[serde(default)]
    pub identities: Vec<Identity>,
    /// Validity windows
    #[serde(default)]
    pub validity: Vec<ValidityWindow>,
    /// Scope grants
    #[serde(default)]
    pub scopes: Vec<Scope>,
    /// Actor open-state intervals
    #[serde(default)]
    pub states: Vec<ActorState>,
    /// Usage records
    #[serde(default)]
    pub usage: Vec<UsageRecord>,
}

fn select<T: Clone>(rows: &[T], pred: impl Fn(&T) -> bool) -> Vec<T> {
    rows.iter().filter(|row| pred(row)).cloned().collect()
}

impl Tables {
    /// Unique columns are `name` and `email`.
    ///
    /// The API-key hash is not constrained; duplicates surface at lookup time.
    fn check_unique(&self, candidate: &Identity) -> Result<(), StorageError> {
        for existing in &self.identities {
            if existing.id == candidate.id {
                return Err(StorageError::Conflict { field: "id" });
            }
            if existing.name == candidate.name {
                return Err(StorageError::Conflict { field: "name" });
            }
            if candidate.email.is_some() && existing.email == candidate.email {
                return Err(StorageError::Conflict { field: "email" });
            }
        }
        Ok(())
    }

    /// Append an identity after the uniqueness check
    pub fn insert_identity(&mut self, identity: Identity) -> Result<(), StorageError> {
        self.check_unique(&identity)?;
        self.identities.push(identity);
        Ok(())
    }

    /// Apply `update` to every matching identity
    pub fn update_identities(&mut self, filter: &IdentityFilter, update: &IdentityUpdate) -> usize {
        let mut count = 0;
        for identity in self.identities.iter_mut().filter(|i| filter.matches(i)) {
            update.apply(identity);
            count += 1;
        }
        count
    }

    /// Matching identities
    pub fn select_identities(&self, filter: &IdentityFilter) -> Vec<Identity> {
        select(&self.identities, |i| filter.matches(i))
    }

    /// Matching validity windows
    pub fn select_validity(&self, filter: &ValidityFilter) -> Vec<ValidityWindow> {
        select(&self.validity, |w| filter.matches(w))
    }

    /// Matching scopes
    pub fn select_scopes(&self, filter: &ScopeFilter) -> Vec<Scope> {
        select(&self.scopes, |s| filter.matches(s))
    }

    /// Matching state intervals
    pub fn select_states(&self, filter: &StateFilter) -> Vec<ActorState> {
        select(&self.states, |s| filter.matches(s))
    }

    /// Matching usage rows
    pub fn select_usage(&self, filter: &UsageFilter) -> Vec<UsageRecord> {
        select(&self.usage, |r| filter.matches(r))
    }

    /// Move every matching usage row to `timestamp`
    pub fn touch_usage(&mut self, filter: &UsageFilter, timestamp: Timestamp) -> usize {
        let mut count = 0;
        for record in self.usage.iter_mut().filter(|r| filter.matches(r)) {
            record.timestamp = timestamp;
            record.updated_at = timestamp;
            count += 1;
        }
        count
    }
}

/// In-memory repository
///
/// Cloning shares the underlying tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RepositoryEffects for MemoryRepository {
    async fn insert_identity(&self, identity: Identity) -> Result<(), StorageError> {
        self.tables.write().await.insert_identity(identity)
    }

    async fn update_identities(
        &self,
        filter: &IdentityFilter,
        update: &IdentityUpdate,
    ) -> Result<usize, StorageError> {
        Ok(self.tables.write().await.update_identities(filter, update))
    }

    async fn select_identities(
        &self,
        filter: &IdentityFilter,
    ) -> Result<Vec<Identity>, StorageError> {
        Ok(self.tables.read().await.select_identities(filter))
    }

    async fn insert_validity(&self, window: ValidityWindow) -> Result<(), StorageError> {
        self.tables.write().await.validity.push(window);
        Ok(())
    }

    async fn select_validity(
        &self,
        filter: &ValidityFilter,
    ) -> Result<Vec<ValidityWindow>, StorageError> {
        Ok(self.tables.read().await.select_validity(filter))
    }

    async fn insert_scope(&self, scope: Scope) -> Result<(), StorageError> {
        self.tables.write().await.scopes.push(scope);
        Ok(())
    }

    async fn select_scopes(&self, filter: &ScopeFilter) -> Result<Vec<Scope>, StorageError> {
        Ok(self.tables.read().await.select_scopes(filter))
    }

    async fn insert_state(&self, state: ActorState) -> Result<(), StorageError> {
        self.tables.write().await.states.push(state);
        Ok(())
    }

    async fn select_states(&self, filter: &StateFilter) -> Result<Vec<ActorState>, StorageError> {
        Ok(self.tables.read().await.select_states(filter))
    }

    async fn insert_usage(&self, record: UsageRecord) -> Result<(), StorageError> {
        self.tables.write().await.usage.push(record);
        Ok(())
    }

    async fn touch_usage(
        &self,
        filter: &UsageFilter,
        timestamp: Timestamp,
    ) -> Result<usize, StorageError> {
        Ok(self.tables.write().await.touch_usage(filter, timestamp))
    }

    async fn select_usage(&self, filter: &UsageFilter) -> Result<Vec<UsageRecord>, StorageError> {
        Ok(self.tables.read().await.select_usage(filter))
    }
}
