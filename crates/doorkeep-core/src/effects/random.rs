//! Randomness effect used to mint raw API keys and salts.

use std::sync::Arc;

/// Source of high-entropy bytes
pub trait RandomEffects: Send + Sync {
    /// Fill a fresh buffer of `len` random bytes
    fn random_bytes(&self, len: usize) -> Vec<u8>;
}

impl<T: RandomEffects + ?Sized> RandomEffects for Arc<T> {
    fn random_bytes(&self, len: usize) -> Vec<u8> {
        (**self).random_bytes(len)
    }
}
