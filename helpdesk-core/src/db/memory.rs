//! In-process slot store

use super::SlotStore;
use crate::error::PersistenceError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Slots held in a `HashMap`.
///
/// Reads and writes can be switched to fail, which is how tests simulate an
/// unavailable or full storage backend.
#[derive(Debug, Default)]
pub struct MemorySlots {
    slots: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with one slot already populated
    pub fn with_slot(key: &str, value: &str) -> Self {
        let slots = Self::new();
        slots.map().insert(key.to_string(), value.to_string());
        slots
    }

    /// Make every subsequent read fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail, as a full quota would
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw slot contents, bypassing failure switches
    pub fn peek(&self, key: &str) -> Option<String> {
        self.map().get(key).cloned()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SlotStore for MemorySlots {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PersistenceError::Read {
                key: key.to_string(),
                message: "storage unavailable".to_string(),
            });
        }
        Ok(self.map().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Write {
                key: key.to_string(),
                message: "quota exceeded".to_string(),
            });
        }
        self.map().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Write {
                key: key.to_string(),
                message: "quota exceeded".to_string(),
            });
        }
        self.map().remove(key);
        Ok(())
    }
}
