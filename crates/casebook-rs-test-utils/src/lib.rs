//! Test helpers shared across Casebook crates.

pub mod backend;
pub mod records;

pub use backend::{FailingBackend, InMemoryBackend, StalledBackend};
pub use records::{offline_store, store_with};
