//! In-memory storage implementation.
//!
//! Slots live in a shared map and are lost when the last clone is dropped.
//! Each write is counted so tests can observe how often the store persisted.

use crate::storage::KeyValueStore;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory key-value backend.
///
/// Clones share the same slots and write counter, so a test can hand one
/// clone to a store and inspect the other.
///
/// # Examples
///
/// ```
/// use devtrack::storage::{InMemoryStorage, KeyValueStore};
///
/// let storage = InMemoryStorage::new();
/// let observer = storage.clone();
///
/// storage.set("k", "v").unwrap();
/// assert_eq!(observer.write_count(), 1);
/// assert_eq!(observer.get("k").unwrap().as_deref(), Some("v"));
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryStorage {
    /// Create an empty in-memory storage instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage instance with one slot already populated.
    ///
    /// The initial value does not count as a write.
    pub fn with_slot(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        if let Ok(mut slots) = storage.slots.lock() {
            slots.insert(key.into(), value.into());
        }
        storage
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn slots(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.slots
            .lock()
            .map_err(|_| anyhow!("In-memory storage lock poisoned"))
    }
}

impl KeyValueStore for InMemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.slots()?.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.slots()?.remove(key);
        Ok(())
    }
}
