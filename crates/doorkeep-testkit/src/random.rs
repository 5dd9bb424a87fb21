//! Seeded randomness

use doorkeep_core::effects::RandomEffects;
use parking_lot::Mutex;
use rand::RngCore;
use rand_chacha::{rand_core::SeedableRng, ChaCha20Rng};

/// ChaCha20 stream from a fixed seed; same seed, same keys
#[derive(Debug)]
pub struct SequenceRandom {
    rng: Mutex<ChaCha20Rng>,
}

impl SequenceRandom {
    /// Stream seeded with `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }
}

impl RandomEffects for SequenceRandom {
    fn random_bytes(&self, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        self.rng.lock().fill_bytes(&mut bytes);
        bytes
    }
}
