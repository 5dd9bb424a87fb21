//! Effect interfaces
//!
//! Pure trait definitions for everything the access core needs from the outside
//! world. Cheap, local capabilities (clock, randomness, hashing, scheduling) are
//! synchronous; the repository is asynchronous because it fronts a store.
//!
//! Production handlers live in `doorkeep-effects`. Deterministic handlers for
//! tests live in `doorkeep-testkit`.

pub mod hashing;
pub mod random;
pub mod repository;
pub mod sanitation;
pub mod time;

pub use hashing::PasswordHashEffects;
pub use random::RandomEffects;
pub use repository::{
    IdentityFilter, IdentityUpdate, RepositoryEffects, ScopeFilter, StateFilter, UsageFilter,
    ValidityFilter,
};
pub use sanitation::SanitationSchedule;
pub use time::ClockEffects;
