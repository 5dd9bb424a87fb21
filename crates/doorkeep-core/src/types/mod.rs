//! Stored entities
//!
//! Each entity carries its own id plus `created_at`/`updated_at`. Rows reference
//! identities by [`IdentityId`](crate::IdentityId) only; the repository owns them.

mod identity;
mod scope;
mod state;
mod usage;
mod validity;

pub use identity::{Identity, Role};
pub use scope::{Mode, Scope};
pub use state::{open_pulse, ActorState, OPEN_PULSE_SECS};
pub use usage::{UsageRecord, UsageType};
pub use validity::ValidityWindow;
