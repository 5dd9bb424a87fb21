//! Identity and credential store
//!
//! Raw API keys are 32 random bytes, hex encoded, handed out exactly once. Only
//! their fast hash is stored, so a lost key can only be replaced, never recovered.
//! Passwords are stored as salted slow hashes.

use crate::effects::AccessEffects;
use doorkeep_core::effects::{IdentityFilter, IdentityUpdate};
use doorkeep_core::{AccessError, AccessResult, Identity, IdentityId, PasswordWeakness, Role};
use serde::Serialize;

const API_KEY_BYTES: usize = 32;
const MIN_PASSWORD_LEN: usize = 8;

/// Result of creating an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIdentity {
    /// Id of the new identity
    pub id: IdentityId,
    /// Raw API key; not retrievable again
    pub api_key: String,
    /// Whether a password hash was stored
    pub password_set: bool,
}

/// Check a password against the strength policy.
///
/// Requires at least eight characters, one lowercase letter, one uppercase
/// letter, one digit, and one character outside ASCII letters and digits.
pub fn check_password_policy(raw: &str) -> Result<(), PasswordWeakness> {
    if raw.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordWeakness::TooShort);
    }
    if !raw.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(PasswordWeakness::NoLowercase);
    }
    if !raw.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordWeakness::NoUppercase);
    }
    if !raw.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordWeakness::NoDigit);
    }
    if !raw.chars().any(|c| !c.is_ascii_alphanumeric()) {
        return Err(PasswordWeakness::NoSpecial);
    }
    Ok(())
}

/// Identity records and their credentials
#[derive(Debug, Clone)]
pub struct CredentialStore {
    effects: AccessEffects,
}

impl CredentialStore {
    /// Store over the given effects
    pub fn new(effects: AccessEffects) -> Self {
        Self { effects }
    }

    fn generate_api_key(&self) -> String {
        hex::encode(self.effects.random.random_bytes(API_KEY_BYTES))
    }

    /// Resolve a raw API key to the identity holding it.
    ///
    /// More than one match is a data-integrity anomaly: it is logged and the
    /// first row wins.
    pub async fn resolve_identity(&self, raw_api_key: &str) -> AccessResult<Option<IdentityId>> {
        let hash = self.effects.hasher.hash_fast(raw_api_key);
        let matches = self
            .effects
            .repository
            .select_identities(&IdentityFilter::by_api_key_hash(hash.as_str()))
            .await?;
        if matches.len() > 1 {
            tracing::warn!(
                key_hash = %hash,
                rows = matches.len(),
                "api key hash found in more than one identity row"
            );
        }
        Ok(matches.first().map(|identity| identity.id))
    }

    /// Create an identity with a fresh API key and optional password
    pub async fn create_identity(
        &self,
        name: &str,
        role: Role,
        email: Option<&str>,
        raw_password: Option<&str>,
    ) -> AccessResult<NewIdentity> {
        let credential_hash = raw_password
            .map(|raw| self.effects.hasher.hash_slow(raw))
            .transpose()?;
        let api_key = self.generate_api_key();
        let now = self.effects.clock.now();
        let identity = Identity {
            id: IdentityId::new_random(),
            name: name.to_string(),
            role,
            email: email.map(str::to_string),
            credential_hash,
            api_key_hash: Some(self.effects.hasher.hash_fast(&api_key)),
            created_at: now,
            updated_at: now,
        };
        let id = identity.id;
        let password_set = identity.credential_hash.is_some();
        self.effects.repository.insert_identity(identity).await?;
        tracing::info!(identity = %id, name, %role, password_set, "identity created");
        Ok(NewIdentity {
            id,
            api_key,
            password_set,
        })
    }

    /// Issue a new API key, invalidating the previous one
    pub async fn regenerate_api_key(&self, id: IdentityId) -> AccessResult<String> {
        let api_key = self.generate_api_key();
        let update = IdentityUpdate::at(self.effects.clock.now())
            .api_key_hash(self.effects.hasher.hash_fast(&api_key));
        let updated = self
            .effects
            .repository
            .update_identities(&IdentityFilter::by_id(id), &update)
            .await?;
        if updated == 0 {
            return Err(AccessError::IdentityNotFound(id));
        }
        tracing::info!(identity = %id, "api key regenerated");
        Ok(api_key)
    }

    /// Set a password after checking it against the strength policy
    pub async fn set_password(&self, id: IdentityId, raw_password: &str) -> AccessResult<()> {
        check_password_policy(raw_password).map_err(AccessError::WeakPassword)?;
        let hash = self.effects.hasher.hash_slow(raw_password)?;
        let update = IdentityUpdate::at(self.effects.clock.now()).credential_hash(hash);
        let updated = self
            .effects
            .repository
            .update_identities(&IdentityFilter::by_id(id), &update)
            .await?;
        if updated == 0 {
            return Err(AccessError::IdentityNotFound(id));
        }
        tracing::info!(identity = %id, "password updated");
        Ok(())
    }

    /// Compare a password with the stored hash; `false` when none is stored
    pub async fn check_password(&self, id: IdentityId, raw_password: &str) -> AccessResult<bool> {
        let identity = self
            .identity(id)
            .await?
            .ok_or(AccessError::IdentityNotFound(id))?;
        match identity.credential_hash {
            Some(hash) => Ok(self.effects.hasher.verify_slow(raw_password, &hash)?),
            None => Ok(false),
        }
    }

    /// Whether the key belongs to an admin; `false` for unknown keys
    pub async fn is_admin(&self, raw_api_key: &str) -> AccessResult<bool> {
        let Some(id) = self.resolve_identity(raw_api_key).await? else {
            return Ok(false);
        };
        Ok(matches!(self.role_of(id).await?, Some(Role::Admin)))
    }

    /// Identity by id
    pub async fn identity(&self, id: IdentityId) -> AccessResult<Option<Identity>> {
        let rows = self
            .effects
            .repository
            .select_identities(&IdentityFilter::by_id(id))
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Role of an identity, `None` if it does not exist
    pub async fn role_of(&self, id: IdentityId) -> AccessResult<Option<Role>> {
        Ok(self.identity(id).await?.map(|identity| identity.role))
    }

    /// Identity by name
    pub async fn find_by_name(&self, name: &str) -> AccessResult<Option<Identity>> {
        let rows = self
            .effects
            .repository
            .select_identities(&IdentityFilter::by_name(name))
            .await?;
        Ok(rows.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::effects;

    #[test]
    fn password_policy_reports_first_failed_rule() {
        assert_eq!(check_password_policy("Ab1!"), Err(PasswordWeakness::TooShort));
        assert_eq!(check_password_policy("ABCDEFG1!"), Err(PasswordWeakness::NoLowercase));
        assert_eq!(check_password_policy("abcdefg1!"), Err(PasswordWeakness::NoUppercase));
        assert_eq!(check_password_policy("Abcdefgh!"), Err(PasswordWeakness::NoDigit));
        assert_eq!(check_password_policy("SonneMondUndSterne1"), Err(PasswordWeakness::NoSpecial));
        assert_eq!(check_password_policy("Sonne-Mond-1"), Ok(()));
    }

    #[tokio::test]
    async fn created_key_resolves_to_created_identity() {
        let (fx, _clock) = effects();
        let store = CredentialStore::new(fx);
        let created = store
            .create_identity("actor1", Role::Actor, None, None)
            .await
            .unwrap();
        assert_eq!(created.api_key.len(), 64);
        assert!(!created.password_set);
        assert_eq!(
            store.resolve_identity(&created.api_key).await.unwrap(),
            Some(created.id)
        );
        assert_eq!(store.resolve_identity("not-a-key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn raw_key_is_never_stored() {
        let (fx, _clock) = effects();
        let store = CredentialStore::new(fx.clone());
        let created = store
            .create_identity("user1", Role::User, Some("u1@example.org"), Some("nfr21Party!"))
            .await
            .unwrap();
        let row = store.identity(created.id).await.unwrap().unwrap();
        assert_ne!(row.api_key_hash.as_deref(), Some(created.api_key.as_str()));
        assert_eq!(
            row.api_key_hash,
            Some(fx.hasher.hash_fast(&created.api_key))
        );
        assert!(created.password_set);
        assert!(store.check_password(created.id, "nfr21Party!").await.unwrap());
        assert!(!store.check_password(created.id, "wrong").await.unwrap());
    }

    #[tokio::test]
    async fn regenerating_invalidates_old_key() {
        let (fx, _clock) = effects();
        let store = CredentialStore::new(fx);
        let created = store
            .create_identity("user1", Role::User, None, None)
            .await
            .unwrap();
        let before = store.identity(created.id).await.unwrap().unwrap().api_key_hash;

        let fresh = store.regenerate_api_key(created.id).await.unwrap();
        let after = store.identity(created.id).await.unwrap().unwrap().api_key_hash;

        assert_ne!(before, after);
        assert_eq!(store.resolve_identity(&created.api_key).await.unwrap(), None);
        assert_eq!(store.resolve_identity(&fresh).await.unwrap(), Some(created.id));
    }

    #[tokio::test]
    async fn regenerating_for_missing_identity_fails() {
        let (fx, _clock) = effects();
        let store = CredentialStore::new(fx);
        let missing = IdentityId::new_random();
        assert_eq!(
            store.regenerate_api_key(missing).await,
            Err(AccessError::IdentityNotFound(missing))
        );
    }

    #[tokio::test]
    async fn weak_password_is_rejected_and_strong_one_stored() {
        let (fx, _clock) = effects();
        let store = CredentialStore::new(fx);
        let created = store
            .create_identity("user2", Role::User, None, None)
            .await
            .unwrap();
        assert!(!store.check_password(created.id, "anything").await.unwrap());

        let err = store.set_password(created.id, "RocknRoll").await.unwrap_err();
        assert_eq!(err, AccessError::WeakPassword(PasswordWeakness::NoDigit));

        store.set_password(created.id, "RocknRoll-1").await.unwrap();
        assert!(store.check_password(created.id, "RocknRoll-1").await.unwrap());
    }

    #[tokio::test]
    async fn admin_check_by_key() {
        let (fx, _clock) = effects();
        let store = CredentialStore::new(fx);
        let admin = store
            .create_identity("root", Role::Admin, None, None)
            .await
            .unwrap();
        let user = store
            .create_identity("someone", Role::User, None, None)
            .await
            .unwrap();
        assert!(store.is_admin(&admin.api_key).await.unwrap());
        assert!(!store.is_admin(&user.api_key).await.unwrap());
        assert!(!store.is_admin("unknown").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_key_hash_resolves_to_first_row() {
        let (fx, _clock) = effects();
        let store = CredentialStore::new(fx.clone());
        let first = store
            .create_identity("first", Role::User, None, None)
            .await
            .unwrap();
        let second = store
            .create_identity("second", Role::User, None, None)
            .await
            .unwrap();
        let shared = fx.hasher.hash_fast(&first.api_key);
        fx.repository
            .update_identities(
                &IdentityFilter::by_id(second.id),
                &IdentityUpdate::at(fx.clock.now()).api_key_hash(shared),
            )
            .await
            .unwrap();
        assert_eq!(
            store.resolve_identity(&first.api_key).await.unwrap(),
            Some(first.id)
        );
    }
}
