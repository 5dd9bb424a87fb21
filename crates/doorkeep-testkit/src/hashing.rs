//! Low-cost password hasher

use doorkeep_core::effects::{PasswordHashEffects, RandomEffects};
use doorkeep_core::HashError;
use doorkeep_effects::Pbkdf2PasswordHasher;
use std::sync::Arc;

const TEST_ITERATIONS: u32 = 1;

/// The production hash format at a single PBKDF2 iteration
#[derive(Debug, Clone)]
pub struct FastTestHasher {
    inner: Pbkdf2PasswordHasher,
}

impl FastTestHasher {
    /// Hasher drawing salts from `random`
    pub fn new(random: Arc<dyn RandomEffects>) -> Self {
        let inner = Pbkdf2PasswordHasher::with_iterations(TEST_ITERATIONS)
            .expect("non-zero iteration count")
            .with_random(random);
        Self { inner }
    }
}

impl PasswordHashEffects for FastTestHasher {
    fn hash_slow(&self, raw: &str) -> Result<String, HashError> {
        self.inner.hash_slow(raw)
    }

    fn verify_slow(&self, raw: &str, hash: &str) -> Result<bool, HashError> {
        self.inner.verify_slow(raw, hash)
    }

    fn hash_fast(&self, raw: &str) -> String {
        self.inner.hash_fast(raw)
    }
}
