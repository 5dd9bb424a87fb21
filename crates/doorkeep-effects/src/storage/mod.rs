//! Repository handlers
//!
//! [`MemoryRepository`] keeps every collection in insertion order behind one
//! async lock. [`JsonFileRepository`] runs the same [`Tables`] statements
//! against a JSON file under an advisory file lock.

mod file;
mod memory;

pub use file::JsonFileRepository;
pub use memory::{MemoryRepository, Tables};
