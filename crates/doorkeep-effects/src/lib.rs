//! Doorkeep Effects - production handlers
//!
//! Implementations of the effect traits declared in `doorkeep-core`:
//!
//! - [`RealClockHandler`]: system UTC clock
//! - [`RealRandomHandler`]: OS-seeded cryptographic randomness
//! - [`Pbkdf2PasswordHasher`]: PBKDF2-HMAC-SHA256 passwords, SHA-256 API keys
//! - [`MemoryRepository`] and [`JsonFileRepository`]: stores
//! - [`EveryNthCall`] and [`NeverSanitize`]: sanitation schedules
//!
//! Deterministic handlers for tests belong in `doorkeep-testkit`, not here.

#![forbid(unsafe_code)]

pub mod hashing;
pub mod random;
pub mod sanitation;
pub mod storage;
pub mod time;

pub use hashing::Pbkdf2PasswordHasher;
pub use random::RealRandomHandler;
pub use sanitation::{EveryNthCall, NeverSanitize};
pub use storage::{JsonFileRepository, MemoryRepository, Tables};
pub use time::RealClockHandler;
