//! Repository effect.
//!
//! CRUD plus predicate queries over the five stored collections. Filters are
//! plain structs whose `None` fields match anything; implementations evaluate
//! them with the `matches` helpers here so every backend agrees on semantics.
//!
//! Each call is one atomic statement. The access core never needs a
//! transaction spanning several calls.

use crate::errors::StorageError;
use crate::identifiers::IdentityId;
use crate::time::Timestamp;
use crate::types::{ActorState, Identity, Mode, Role, Scope, UsageRecord, UsageType, ValidityWindow};
use async_trait::async_trait;
use std::sync::Arc;

/// Predicate over identities
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityFilter {
    /// Match on id
    pub id: Option<IdentityId>,
    /// Match on name
    pub name: Option<String>,
    /// Match on role
    pub role: Option<Role>,
    /// Match on API-key hash
    pub api_key_hash: Option<String>,
}

impl IdentityFilter {
    /// Identity with this id
    pub fn by_id(id: IdentityId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Identity with this name
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Identities whose stored API-key hash equals `hash`
    pub fn by_api_key_hash(hash: impl Into<String>) -> Self {
        Self {
            api_key_hash: Some(hash.into()),
            ..Self::default()
        }
    }

    /// Narrow to a role
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Evaluate against a row
    pub fn matches(&self, identity: &Identity) -> bool {
        self.id.map_or(true, |id| identity.id == id)
            && self.name.as_ref().map_or(true, |n| &identity.name == n)
            && self.role.map_or(true, |r| identity.role == r)
            && self
                .api_key_hash
                .as_ref()
                .map_or(true, |h| identity.api_key_hash.as_ref() == Some(h))
    }
}

/// Column changes applied by an identity update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityUpdate {
    /// New password hash
    pub credential_hash: Option<String>,
    /// New API-key hash
    pub api_key_hash: Option<String>,
    /// Mutation instant
    pub updated_at: Timestamp,
}

impl IdentityUpdate {
    /// Update touching nothing but `updated_at`
    pub fn at(updated_at: Timestamp) -> Self {
        Self {
            credential_hash: None,
            api_key_hash: None,
            updated_at,
        }
    }

    /// Replace the password hash
    pub fn credential_hash(mut self, hash: String) -> Self {
        self.credential_hash = Some(hash);
        self
    }

    /// Replace the API-key hash
    pub fn api_key_hash(mut self, hash: String) -> Self {
        self.api_key_hash = Some(hash);
        self
    }

    /// Apply to a row in place
    pub fn apply(&self, identity: &mut Identity) {
        if let Some(hash) = &self.credential_hash {
            identity.credential_hash = Some(hash.clone());
        }
        if let Some(hash) = &self.api_key_hash {
            identity.api_key_hash = Some(hash.clone());
        }
        identity.updated_at = self.updated_at;
    }
}

/// Predicate over validity windows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidityFilter {
    /// Match on subject
    pub subject_id: Option<IdentityId>,
}

impl ValidityFilter {
    /// Windows of one subject
    pub fn for_subject(subject_id: IdentityId) -> Self {
        Self {
            subject_id: Some(subject_id),
        }
    }

    /// Evaluate against a row
    pub fn matches(&self, window: &ValidityWindow) -> bool {
        self.subject_id.map_or(true, |s| window.subject_id == s)
    }
}

/// Predicate over scopes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeFilter {
    /// Match on permission holder
    pub grantor_id: Option<IdentityId>,
    /// Match on target actor
    pub actor_id: Option<IdentityId>,
    /// Match on mode
    pub mode: Option<Mode>,
}

impl ScopeFilter {
    /// Exact (holder, actor, mode) tuple
    pub fn exact(grantor_id: IdentityId, actor_id: IdentityId, mode: Mode) -> Self {
        Self {
            grantor_id: Some(grantor_id),
            actor_id: Some(actor_id),
            mode: Some(mode),
        }
    }

    /// All scopes held by one identity
    pub fn held_by(grantor_id: IdentityId) -> Self {
        Self {
            grantor_id: Some(grantor_id),
            ..Self::default()
        }
    }

    /// Evaluate against a row
    pub fn matches(&self, scope: &Scope) -> bool {
        self.grantor_id.map_or(true, |g| scope.grantor_id == g)
            && self.actor_id.map_or(true, |a| scope.actor_id == a)
            && self.mode.map_or(true, |m| scope.mode == m)
    }
}

/// Predicate over actor open-state intervals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateFilter {
    /// Match on actor
    pub subject_id: Option<IdentityId>,
}

impl StateFilter {
    /// Intervals of one actor
    pub fn for_actor(subject_id: IdentityId) -> Self {
        Self {
            subject_id: Some(subject_id),
        }
    }

    /// Evaluate against a row
    pub fn matches(&self, state: &ActorState) -> bool {
        self.subject_id.map_or(true, |s| state.subject_id == s)
    }
}

/// Predicate over usage records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageFilter {
    /// Match on caller
    pub user_id: Option<IdentityId>,
    /// Match on actor
    pub actor_id: Option<IdentityId>,
    /// Match on event kind
    pub usage_type: Option<UsageType>,
}

impl UsageFilter {
    /// Records of one kind for one actor
    pub fn for_actor(actor_id: IdentityId, usage_type: UsageType) -> Self {
        Self {
            user_id: None,
            actor_id: Some(actor_id),
            usage_type: Some(usage_type),
        }
    }

    /// Evaluate against a row
    pub fn matches(&self, record: &UsageRecord) -> bool {
        self.user_id.map_or(true, |u| record.user_id == u)
            && self.actor_id.map_or(true, |a| record.actor_id == a)
            && self.usage_type.map_or(true, |t| record.usage_type == t)
    }
}

/// Persistent store of identities, windows, scopes, states, and usage
#[async_trait]
pub trait RepositoryEffects: Send + Sync {
    /// Insert an identity; fails on a duplicate unique column
    async fn insert_identity(&self, identity: Identity) -> Result<(), StorageError>;

    /// Apply `update` to every identity matching `filter`; returns the row count
    async fn update_identities(
        &self,
        filter: &IdentityFilter,
        update: &IdentityUpdate,
    ) -> Result<usize, StorageError>;

    /// Identities matching `filter`, in insertion order
    async fn select_identities(&self, filter: &IdentityFilter)
        -> Result<Vec<Identity>, StorageError>;

    /// Insert a validity window
    async fn insert_validity(&self, window: ValidityWindow) -> Result<(), StorageError>;

    /// Validity windows matching `filter`
    async fn select_validity(
        &self,
        filter: &ValidityFilter,
    ) -> Result<Vec<ValidityWindow>, StorageError>;

    /// Insert a scope grant
    async fn insert_scope(&self, scope: Scope) -> Result<(), StorageError>;

    /// Scopes matching `filter`
    async fn select_scopes(&self, filter: &ScopeFilter) -> Result<Vec<Scope>, StorageError>;

    /// Insert an actor open-state interval
    async fn insert_state(&self, state: ActorState) -> Result<(), StorageError>;

    /// Open-state intervals matching `filter`
    async fn select_states(&self, filter: &StateFilter) -> Result<Vec<ActorState>, StorageError>;

    /// Insert a usage record
    async fn insert_usage(&self, record: UsageRecord) -> Result<(), StorageError>;

    /// Set `timestamp` and `updated_at` on every usage record matching `filter`;
    /// returns the row count
    async fn touch_usage(
        &self,
        filter: &UsageFilter,
        timestamp: Timestamp,
    ) -> Result<usize, StorageError>;

    /// Usage records matching `filter`
    async fn select_usage(&self, filter: &UsageFilter) -> Result<Vec<UsageRecord>, StorageError>;
}

#[async_trait]
impl<T: RepositoryEffects + ?Sized> RepositoryEffects for Arc<T> {
    async fn insert_identity(&self, identity: Identity) -> Result<(), StorageError> {
        (**self).insert_identity(identity).await
    }

    async fn update_identities(
        &self,
        filter: &IdentityFilter,
        update: &IdentityUpdate,
    ) -> Result<usize, StorageError> {
        (**self).update_identities(filter, update).await
    }

    async fn select_identities(
        &self,
        filter: &IdentityFilter,
    ) -> Result<Vec<Identity>, StorageError> {
        (**self).select_identities(filter).await
    }

    async fn insert_validity(&self, window: ValidityWindow) -> Result<(), StorageError> {
        (**self).insert_validity(window).await
    }

    async fn select_validity(
        &self,
        filter: &ValidityFilter,
    ) -> Result<Vec<ValidityWindow>, StorageError> {
        (**self).select_validity(filter).await
    }

    async fn insert_scope(&self, scope: Scope) -> Result<(), StorageError> {
        (**self).insert_scope(scope).await
    }

    async fn select_scopes(&self, filter: &ScopeFilter) -> Result<Vec<Scope>, StorageError> {
        (**self).select_scopes(filter).await
    }

    async fn insert_state(&self, state: ActorState) -> Result<(), StorageError> {
        (**self).insert_state(state).await
    }

    async fn select_states(&self, filter: &StateFilter) -> Result<Vec<ActorState>, StorageError> {
        (**self).select_states(filter).await
    }

    async fn insert_usage(&self, record: UsageRecord) -> Result<(), StorageError> {
        (**self).insert_usage(record).await
    }

    async fn touch_usage(
        &self,
        filter: &UsageFilter,
        timestamp: Timestamp,
    ) -> Result<usize, StorageError> {
        (**self).touch_usage(filter, timestamp).await
    }

    async fn select_usage(&self, filter: &UsageFilter) -> Result<Vec<UsageRecord>, StorageError> {
        (**self).select_usage(filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn identity(name: &str, role: Role, key_hash: Option<&str>) -> Identity {
        let now = Utc::now();
        Identity {
            id: IdentityId::new_random(),
            name: name.into(),
            role,
            email: None,
            credential_hash: None,
            api_key_hash: key_hash.map(str::to_string),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn identity_filter_combines_fields() {
        let admin = identity("_builtin_admin", Role::Admin, Some("abc"));
        assert!(IdentityFilter::by_name("_builtin_admin").matches(&admin));
        assert!(IdentityFilter::by_name("_builtin_admin")
            .with_role(Role::Admin)
            .matches(&admin));
        assert!(!IdentityFilter::by_name("_builtin_admin")
            .with_role(Role::Maintenance)
            .matches(&admin));
        assert!(IdentityFilter::by_api_key_hash("abc").matches(&admin));
        assert!(!IdentityFilter::by_api_key_hash("abd").matches(&admin));
    }

    #[test]
    fn key_hash_filter_never_matches_keyless_identity() {
        let keyless = identity("door", Role::Actor, None);
        assert!(!IdentityFilter::by_api_key_hash("").matches(&keyless));
    }

    #[test]
    fn update_applies_only_given_columns() {
        let mut row = identity("u", Role::User, Some("old"));
        let later = row.updated_at + chrono::Duration::seconds(5);
        IdentityUpdate::at(later)
            .api_key_hash("new".into())
            .apply(&mut row);
        assert_eq!(row.api_key_hash.as_deref(), Some("new"));
        assert_eq!(row.role, Role::User);
        assert_eq!(row.updated_at, later);
    }
}
