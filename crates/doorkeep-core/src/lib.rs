//! Doorkeep Core - Access Control Foundation
//!
//! This crate holds the pure building blocks of the door-actuation access service:
//! identifiers, stored entities, the temporal validity evaluator, the error
//! taxonomy, and the effect interfaces that the outer layers implement.
//!
//! # Layers
//!
//! - **Types**: `Identity`, `ValidityWindow`, `Scope`, `ActorState`, `UsageRecord`
//! - **Evaluation**: [`time::is_active_at`] decides whether any interval covers an instant
//! - **Effects**: `ClockEffects`, `RandomEffects`, `PasswordHashEffects`,
//!   `RepositoryEffects`, `SanitationSchedule`
//!
//! Nothing in this crate performs I/O. Production handlers live in
//! `doorkeep-effects`; deterministic ones live in `doorkeep-testkit`.

#![forbid(unsafe_code)]

/// Typed identifiers for stored records
pub mod identifiers;

/// Timestamps, intervals, and the temporal validity evaluator
pub mod time;

/// Stored entities and their closed enums
pub mod types;

/// Unified error handling
pub mod errors;

/// Effect interfaces (no implementations)
pub mod effects;

pub use errors::{AccessError, AccessResult, ErrorClass, HashError, PasswordWeakness, StorageError};
pub use identifiers::{IdentityId, ScopeId, StateId, UsageId, ValidityId};
pub use time::{is_active_at, Interval, Timestamp};
pub use types::{
    open_pulse, ActorState, Identity, Mode, Role, Scope, UsageRecord, UsageType, ValidityWindow,
    OPEN_PULSE_SECS,
};
