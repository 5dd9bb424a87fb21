//! Effect bundle shared by every component

use doorkeep_core::effects::{ClockEffects, PasswordHashEffects, RandomEffects, RepositoryEffects};
use std::sync::Arc;

/// Handlers the access core runs against
#[derive(Clone)]
pub struct AccessEffects {
    /// Persistent store
    pub repository: Arc<dyn RepositoryEffects>,
    /// Wall clock
    pub clock: Arc<dyn ClockEffects>,
    /// Key material source
    pub random: Arc<dyn RandomEffects>,
    /// Password and API-key hashing
    pub hasher: Arc<dyn PasswordHashEffects>,
}

impl AccessEffects {
    /// Bundle the four handlers
    pub fn new(
        repository: Arc<dyn RepositoryEffects>,
        clock: Arc<dyn ClockEffects>,
        random: Arc<dyn RandomEffects>,
        hasher: Arc<dyn PasswordHashEffects>,
    ) -> Self {
        Self {
            repository,
            clock,
            random,
            hasher,
        }
    }
}

impl std::fmt::Debug for AccessEffects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessEffects").finish_non_exhaustive()
    }
}
