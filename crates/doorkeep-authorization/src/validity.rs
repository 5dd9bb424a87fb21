//! Identity validity windows

use crate::effects::AccessEffects;
use doorkeep_core::effects::ValidityFilter;
use doorkeep_core::{is_active_at, AccessResult, IdentityId, Timestamp, ValidityId, ValidityWindow};

/// Grants and evaluates validity windows
#[derive(Debug, Clone)]
pub struct ValidityRegistry {
    effects: AccessEffects,
}

impl ValidityRegistry {
    /// Registry over the given effects
    pub fn new(effects: AccessEffects) -> Self {
        Self { effects }
    }

    /// Add a window for `subject`. Inverted windows are stored and stay inert.
    pub async fn grant(
        &self,
        subject: IdentityId,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
    ) -> AccessResult<ValidityId> {
        let now = self.effects.clock.now();
        let window = ValidityWindow {
            id: ValidityId::new_random(),
            subject_id: subject,
            start,
            end,
            created_at: now,
            updated_at: now,
        };
        let id = window.id;
        if window.interval().is_vacuous() {
            tracing::warn!(subject = %subject, ?start, ?end, "storing a validity window that can never be active");
        }
        self.effects.repository.insert_validity(window).await?;
        tracing::info!(subject = %subject, window = %id, "validity window granted");
        Ok(id)
    }

    /// Whether any of the subject's windows covers the current instant
    pub async fn is_valid(&self, subject: IdentityId) -> AccessResult<bool> {
        let windows = self
            .effects
            .repository
            .select_validity(&ValidityFilter::for_subject(subject))
            .await?;
        let intervals: Vec<_> = windows.iter().map(ValidityWindow::interval).collect();
        Ok(is_active_at(&intervals, self.effects.clock.now()))
    }
}
