//! Credential hashing handler
//!
//! Passwords: PBKDF2-HMAC-SHA256 with a random 16-byte salt, encoded as
//! `pbkdf2-sha256$<iterations>$<salt-hex>$<key-hex>` so the cost travels with
//! the hash. API keys: plain SHA-256, hex encoded, for equality lookup.

use doorkeep_core::effects::{PasswordHashEffects, RandomEffects};
use doorkeep_core::HashError;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::random::RealRandomHandler;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;

/// Default PBKDF2 iteration count
pub const DEFAULT_ITERATIONS: u32 = 210_000;

/// PBKDF2 password hasher with SHA-256 API-key hashing
#[derive(Clone)]
pub struct Pbkdf2PasswordHasher {
    iterations: u32,
    random: Arc<dyn RandomEffects>,
}

impl std::fmt::Debug for Pbkdf2PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pbkdf2PasswordHasher")
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}

impl Default for Pbkdf2PasswordHasher {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            random: Arc::new(RealRandomHandler::new()),
        }
    }
}

impl Pbkdf2PasswordHasher {
    /// Hasher with a custom iteration count
    pub fn with_iterations(iterations: u32) -> Result<Self, HashError> {
        if iterations == 0 {
            return Err(HashError::Config("iterations must be positive".into()));
        }
        Ok(Self {
            iterations,
            ..Self::default()
        })
    }

    /// Replace the salt source
    pub fn with_random(mut self, random: Arc<dyn RandomEffects>) -> Self {
        self.random = random;
        self
    }

    /// Configured iteration count
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    fn derive(password: &[u8], salt: &[u8], iterations: u32) -> [u8; 32] {
        let mut key = [0u8; 32];
        pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key);
        key
    }
}

impl PasswordHashEffects for Pbkdf2PasswordHasher {
    fn hash_slow(&self, raw: &str) -> Result<String, HashError> {
        let salt = self.random.random_bytes(SALT_LEN);
        let key = Self::derive(raw.as_bytes(), &salt, self.iterations);
        Ok(format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            hex::encode(salt),
            hex::encode(key)
        ))
    }

    fn verify_slow(&self, raw: &str, hash: &str) -> Result<bool, HashError> {
        let mut parts = hash.split('$');
        let (Some(scheme), Some(iterations), Some(salt), Some(key), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(HashError::Malformed("expected four '$'-separated fields".into()));
        };
        if scheme != SCHEME {
            return Err(HashError::Malformed(format!("unknown scheme {scheme}")));
        }
        let iterations: u32 = iterations
            .parse()
            .map_err(|_| HashError::Malformed("iteration count".into()))?;
        if iterations == 0 {
            return Err(HashError::Malformed("iteration count".into()));
        }
        let salt = hex::decode(salt).map_err(|e| HashError::Malformed(e.to_string()))?;
        let expected = hex::decode(key).map_err(|e| HashError::Malformed(e.to_string()))?;

        let actual = Self::derive(raw.as_bytes(), &salt, iterations);
        Ok(bool::from(actual[..].ct_eq(&expected[..])))
    }

    fn hash_fast(&self, raw: &str) -> String {
        hex::encode(Sha256::digest(raw.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Pbkdf2PasswordHasher {
        Pbkdf2PasswordHasher::with_iterations(2).unwrap()
    }

    #[test]
    fn fast_hash_is_sha256_hex() {
        let hasher = cheap();
        assert_eq!(
            hasher.hash_fast("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hasher.hash_fast("abc"), hasher.hash_fast("abc"));
    }

    #[test]
    fn slow_hash_is_salted_and_verifies() {
        let hasher = cheap();
        let a = hasher.hash_slow("SonneMondUndSterne").unwrap();
        let b = hasher.hash_slow("SonneMondUndSterne").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("pbkdf2-sha256$2$"));
        assert!(hasher.verify_slow("SonneMondUndSterne", &a).unwrap());
        assert!(hasher.verify_slow("SonneMondUndSterne", &b).unwrap());
        assert!(!hasher.verify_slow("sonnemondundsterne", &a).unwrap());
    }

    #[test]
    fn verification_honours_embedded_cost() {
        let stored = Pbkdf2PasswordHasher::with_iterations(3)
            .unwrap()
            .hash_slow("Pa$$w0rd")
            .unwrap();
        assert!(cheap().verify_slow("Pa$$w0rd", &stored).unwrap());
    }

    #[test]
    fn matches_published_vectors() {
        // PBKDF2-HMAC-SHA256, P="password", S="salt", dkLen=32
        assert_eq!(
            hex::encode(Pbkdf2PasswordHasher::derive(b"password", b"salt", 1)),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );
        assert_eq!(
            hex::encode(Pbkdf2PasswordHasher::derive(b"password", b"salt", 2)),
            "ae4d0c95af6b46d32d0adff928f06dd02a303f8ef3c251dfd6e2d85a95474c43"
        );
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let hasher = cheap();
        assert!(hasher.verify_slow("x", "nonsense").is_err());
        assert!(hasher.verify_slow("x", "bcrypt$1$00$00").is_err());
        assert!(hasher.verify_slow("x", "pbkdf2-sha256$0$00$00").is_err());
    }

    #[test]
    fn zero_iterations_rejected() {
        assert!(Pbkdf2PasswordHasher::with_iterations(0).is_err());
    }
}
