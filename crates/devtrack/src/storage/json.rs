//! JSON file-based storage implementation.
//!
//! Each slot is a file named `<key>.json` under the storage root. Writes are
//! atomic: the value goes to a uniquely named temp file in the same directory,
//! which is then renamed over the slot file, so concurrent writers never share
//! a temp path.

use crate::storage::{validate_key, KeyValueStore};
use anyhow::{Context, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use tempfile::NamedTempFile;
use std::path::{Path, PathBuf};

/// File-backed key-value storage rooted at a data directory.
///
/// The directory is created on first write; reading from a missing directory
/// yields empty slots.
#[derive(Clone, Debug)]
pub struct JsonFileStorage {
    root: PathBuf,
}

impl JsonFileStorage {
    /// Create a new JSON file storage instance at the given root path
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the slot files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`.
    pub fn slot_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read file: {}", path.display()))
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.root).with_context(|| {
            format!("Failed to create data directory: {}", self.root.display())
        })?;

        // Atomic write: write to temp file, then rename
        let mut temp = NamedTempFile::new_in(&self.root).with_context(|| {
            format!("Failed to create temporary file in {}", self.root.display())
        })?;
        temp.write_all(value.as_bytes())
            .context("Failed to write temporary file")?;
        temp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace file: {}", path.display()))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to delete file: {}", path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, JsonFileStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(temp_dir.path().join(".devtrack"));
        (temp_dir, storage)
    }

    #[test]
    fn test_get_from_missing_directory_is_none() {
        let (_temp_dir, storage) = setup();
        assert_eq!(storage.get("devtrack_issues").unwrap(), None);
    }

    #[test]
    fn test_set_creates_directory_and_file() {
        let (_temp_dir, storage) = setup();
        storage.set("devtrack_issues", "[]").unwrap();

        let path = storage.root().join("devtrack_issues.json");
        assert!(path.exists());
        assert_eq!(fs::read_to_string(path).unwrap(), "[]");
    }

    #[test]
    fn test_set_leaves_no_temp_file() {
        let (_temp_dir, storage) = setup();
        storage.set("k", "value").unwrap();

        let names: Vec<_> = fs::read_dir(storage.root())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["k.json".to_string()]);
    }

    #[test]
    fn test_concurrent_writers_to_same_slot() {
        let (_temp_dir, storage) = setup();
        storage.set("k", "seed").unwrap();

        std::thread::scope(|scope| {
            for writer in 0..4 {
                let storage = &storage;
                scope.spawn(move || {
                    for round in 0..25 {
                        storage
                            .set("k", &format!("[{writer},{round}]"))
                            .expect("every concurrent write should land");
                    }
                });
            }
        });

        let value = storage.get("k").unwrap().unwrap();
        assert!(value.starts_with('[') && value.ends_with(",24]"), "{value}");
        assert_eq!(fs::read_dir(storage.root()).unwrap().count(), 1);
    }

    #[test]
    fn test_set_overwrites() {
        let (_temp_dir, storage) = setup();
        storage.set("k", "first").unwrap();
        storage.set("k", "second").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let (_temp_dir, storage) = setup();
        let err = storage.set("../outside", "x").unwrap_err();
        assert!(err.to_string().contains("invalid character"));
        assert!(storage.get("").is_err());
    }

    #[test]
    fn test_unreadable_slot_is_an_error() {
        let (_temp_dir, storage) = setup();
        // A directory where the slot file should be cannot be read as a string
        fs::create_dir_all(storage.root().join("k.json")).unwrap();
        assert!(storage.get("k").is_err());
    }
}
