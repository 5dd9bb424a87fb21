use crate::identifiers::{IdentityId, UsageId};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of usage event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsageType {
    /// An open pulse was written; appended
    #[serde(rename = "setState")]
    SetState,
    /// Most recent state query for the actor; one row per actor, upserted
    #[serde(rename = "last_getState")]
    LastGetState,
    /// A state query that observed the actor open; appended
    #[serde(rename = "getState_true")]
    GetStateTrue,
}

impl UsageType {
    /// Wire name of the usage type
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageType::SetState => "setState",
            UsageType::LastGetState => "last_getState",
            UsageType::GetStateTrue => "getState_true",
        }
    }

    /// Whether records of this type are kept as a single row per actor
    pub fn is_singleton(&self) -> bool {
        matches!(self, UsageType::LastGetState)
    }
}

impl fmt::Display for UsageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timestamped usage event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Row id
    pub id: UsageId,
    /// Calling identity
    pub user_id: IdentityId,
    /// Target actor
    pub actor_id: IdentityId,
    /// Event kind
    #[serde(rename = "type")]
    pub usage_type: UsageType,
    /// When the event happened
    pub timestamp: Timestamp,
    /// Creation instant
    pub created_at: Timestamp,
    /// Last mutation instant
    pub updated_at: Timestamp,
}
