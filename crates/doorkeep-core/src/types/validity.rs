use crate::identifiers::{IdentityId, ValidityId};
use crate::time::{Interval, Timestamp};
use serde::{Deserialize, Serialize};

/// One interval during which `subject_id` may act
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    /// Row id
    pub id: ValidityId,
    /// Identity the window applies to
    pub subject_id: IdentityId,
    /// Start bound, `None` for the unbounded past
    pub start: Option<Timestamp>,
    /// End bound, `None` for the unbounded future
    pub end: Option<Timestamp>,
    /// Creation instant
    pub created_at: Timestamp,
    /// Last mutation instant
    pub updated_at: Timestamp,
}

impl ValidityWindow {
    /// The window as an evaluable interval
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}
