//! Doorkeep Testing Infrastructure
//!
//! Deterministic stand-ins for the production handlers and a fully wired
//! fixture for scenario tests.
//!
//! ```rust,no_run
//! use doorkeep_testkit::{ts, World};
//!
//! # async fn demo() -> doorkeep_core::AccessResult<()> {
//! let world = World::new().await?;
//! let door = world.add_actor("door1").await?;
//! world.clock.set(ts(12, 30, 0));
//! # Ok(())
//! # }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod hashing;
pub mod random;
pub mod time;
pub mod world;

pub use hashing::FastTestHasher;
pub use random::SequenceRandom;
pub use time::{ts, ControllableClock};
pub use world::{Provisioned, World};
