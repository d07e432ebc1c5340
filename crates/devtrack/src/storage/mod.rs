//! Storage abstraction for persisting the issue collection.
//!
//! The store persists its whole collection as one JSON document in a single
//! key-value slot. `KeyValueStore` abstracts that slot so the JSON-file
//! backend and the in-memory backend can be swapped freely.

use anyhow::{bail, Result};

pub mod json;
pub mod memory;

pub use json::JsonFileStorage;
pub use memory::InMemoryStorage;

/// Slot that holds the issue collection unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "devtrack_issues";

/// A durable string-valued key-value store.
///
/// Backends are shared between the issue store and its deferred write task,
/// so implementations must be `Send + Sync`.
///
/// # Examples
///
/// ```
/// use devtrack::storage::{InMemoryStorage, KeyValueStore};
///
/// let storage = InMemoryStorage::new();
/// storage.set("devtrack_issues", "[]").unwrap();
/// assert_eq!(storage.get("devtrack_issues").unwrap().as_deref(), Some("[]"));
/// ```
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot exists but cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted (e.g. quota exceeded).
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Clear the slot. Removing an empty slot is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Reject keys that cannot double as a file stem.
///
/// Keys must be non-empty and use only ASCII letters, digits, `_`, `-`, `.`,
/// and must not start with a dot.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        bail!("Storage key must not be empty");
    }
    if let Some(c) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        bail!("Storage key contains invalid character {:?}: {}", c, key);
    }
    if key.starts_with('.') {
        bail!("Storage key must not start with '.': {}", key);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key(DEFAULT_STORAGE_KEY).is_ok());
        assert!(validate_key("issues-v1.backup").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key(".hidden").is_err());
        assert!(validate_key("../escape").is_err());
        assert!(validate_key("a/b").is_err());
    }

    #[test]
    fn test_validate_key_messages() {
        let err = validate_key("../escape").unwrap_err();
        assert!(err.to_string().contains("invalid character '/'"));

        let err = validate_key(".hidden").unwrap_err();
        assert!(err.to_string().contains("must not start with '.'"));
    }

    #[test]
    fn test_backends_share_semantics() {
        fn exercise<S: KeyValueStore>(storage: S) {
            assert_eq!(storage.get("k").unwrap(), None);
            storage.set("k", "one").unwrap();
            storage.set("k", "two").unwrap();
            assert_eq!(storage.get("k").unwrap().as_deref(), Some("two"));
            storage.remove("k").unwrap();
            storage.remove("k").unwrap();
            assert_eq!(storage.get("k").unwrap(), None);
        }

        exercise(InMemoryStorage::new());
        let temp_dir = tempfile::tempdir().unwrap();
        exercise(JsonFileStorage::new(temp_dir.path()));
    }
}
