//! Credential hashing effect.
//!
//! Two hash families with different jobs: a salted slow hash for
//! passwords, and a deterministic fast hash for API-key lookup. The fast hash
//! must never be used for passwords.

use crate::errors::HashError;
use std::sync::Arc;

/// Password and API-key hashing
pub trait PasswordHashEffects: Send + Sync {
    /// Salted slow hash of a password, self-describing (salt and cost embedded)
    fn hash_slow(&self, raw: &str) -> Result<String, HashError>;

    /// Compare a password against a hash produced by [`hash_slow`](Self::hash_slow)
    fn verify_slow(&self, raw: &str, hash: &str) -> Result<bool, HashError>;

    /// Deterministic hash of an API key, used as the lookup column
    fn hash_fast(&self, raw: &str) -> String;
}

impl<T: PasswordHashEffects + ?Sized> PasswordHashEffects for Arc<T> {
    fn hash_slow(&self, raw: &str) -> Result<String, HashError> {
        (**self).hash_slow(raw)
    }

    fn verify_slow(&self, raw: &str, hash: &str) -> Result<bool, HashError> {
        (**self).verify_slow(raw, hash)
    }

    fn hash_fast(&self, raw: &str) -> String {
        (**self).hash_fast(raw)
    }
}
