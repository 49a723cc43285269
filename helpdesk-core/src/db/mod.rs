//! Durable key-value slots
//!
//! The ticket store persists through the [`SlotStore`] trait:
//! - [`Database`]: SQLite-backed slots with schema migrations and checksums
//! - [`MemorySlots`]: in-process slots for tests and embedding

pub mod memory;
pub mod repo;
pub mod schema;

pub use memory::MemorySlots;
pub use repo::{Database, SlotRecord};

use crate::error::PersistenceError;
use sha2::{Digest, Sha256};

/// A durable key-value slot store.
///
/// Values are opaque strings written and read wholesale; there are no partial
/// updates.
pub trait SlotStore {
    /// Read a slot. `Ok(None)` when the key has never been written.
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Replace a slot's value.
    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Drop a slot. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

impl<S: SlotStore + ?Sized> SlotStore for &S {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        (**self).remove(key)
    }
}

/// SHA-256 of a slot value, hex encoded.
pub fn content_hash(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}
