//! Usage and liveness recorder
//!
//! `last_getState` is kept as one row per actor and refreshed in place: an
//! UPDATE that touches no row falls back to an INSERT. Two racing first calls
//! can leave two rows; readers take the most recent one, so the anomaly heals
//! itself. Other kinds append.

use crate::effects::AccessEffects;
use doorkeep_core::effects::UsageFilter;
use doorkeep_core::{AccessResult, IdentityId, Timestamp, UsageId, UsageRecord, UsageType};

/// Appends and upserts usage records
#[derive(Debug, Clone)]
pub struct UsageRecorder {
    effects: AccessEffects,
}

impl UsageRecorder {
    /// Recorder over the given effects
    pub fn new(effects: AccessEffects) -> Self {
        Self { effects }
    }

    /// Record that `user` did `usage_type` against `actor` now
    pub async fn record(
        &self,
        user: IdentityId,
        actor: IdentityId,
        usage_type: UsageType,
    ) -> AccessResult<()> {
        let now = self.effects.clock.now();
        if usage_type.is_singleton() {
            let touched = self
                .effects
                .repository
                .touch_usage(&UsageFilter::for_actor(actor, usage_type), now)
                .await?;
            if touched > 0 {
                return Ok(());
            }
        }
        self.effects
            .repository
            .insert_usage(UsageRecord {
                id: UsageId::new_random(),
                user_id: user,
                actor_id: actor,
                usage_type,
                timestamp: now,
                created_at: now,
                updated_at: now,
            })
            .await?;
        Ok(())
    }

    /// Most recent timestamp of `usage_type` for `actor`
    pub async fn latest(
        &self,
        actor: IdentityId,
        usage_type: UsageType,
    ) -> AccessResult<Option<Timestamp>> {
        let rows = self
            .effects
            .repository
            .select_usage(&UsageFilter::for_actor(actor, usage_type))
            .await?;
        Ok(rows.iter().map(|r| r.timestamp).max())
    }

    /// Number of records of `usage_type` for `actor`
    pub async fn count(&self, actor: IdentityId, usage_type: UsageType) -> AccessResult<usize> {
        Ok(self
            .effects
            .repository
            .select_usage(&UsageFilter::for_actor(actor, usage_type))
            .await?
            .len())
    }
}
