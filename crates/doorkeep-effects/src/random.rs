//! Random effect handler
//!
//! This is the handler layer where actual system randomness is provided.

use doorkeep_core::effects::RandomEffects;
use rand::RngCore;

/// Real random handler using cryptographically secure randomness
#[derive(Debug, Clone, Copy, Default)]
pub struct RealRandomHandler;

impl RealRandomHandler {
    /// Create a new real random handler
    pub fn new() -> Self {
        Self
    }
}

impl RandomEffects for RealRandomHandler {
    fn random_bytes(&self, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_requested_length_and_varies() {
        let rng = RealRandomHandler::new();
        assert_eq!(rng.random_bytes(17).len(), 17);
        assert_ne!(rng.random_bytes(32), rng.random_bytes(32));
    }
}
