//! Shared test utilities
//!
//! Storage and sink doubles used across the store's test modules.

#![cfg(test)]

use crate::sink::LogSink;
use crate::storage::KeyValueStore;
use anyhow::{anyhow, bail, Result};
use std::sync::{Arc, Mutex};

/// A failure captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    LoadFailed { key: String, message: String },
    WriteFailed { key: String, message: String },
}

/// Log sink that remembers every report. Clones share the same record.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<SinkEvent>>>,
}

impl RecordingSink {
    /// Snapshot of the reports so far.
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: SinkEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl LogSink for RecordingSink {
    fn load_failed(&self, key: &str, error: &anyhow::Error) {
        self.push(SinkEvent::LoadFailed {
            key: key.to_string(),
            message: format!("{error:#}"),
        });
    }

    fn write_failed(&self, key: &str, error: &anyhow::Error) {
        self.push(SinkEvent::WriteFailed {
            key: key.to_string(),
            message: format!("{error:#}"),
        });
    }
}

/// Storage that fails reads, writes, or both.
#[derive(Clone, Copy, Default)]
pub struct FailingStorage {
    fail_reads: bool,
    fail_writes: bool,
}

impl FailingStorage {
    /// Reads fail; writes are silently accepted and discarded.
    pub fn unreadable() -> Self {
        Self {
            fail_reads: true,
            fail_writes: false,
        }
    }

    /// Reads see an empty slot; writes fail as if the quota were exceeded.
    pub fn read_only() -> Self {
        Self {
            fail_reads: false,
            fail_writes: true,
        }
    }
}

impl KeyValueStore for FailingStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads {
            return Err(anyhow!("Failed to read slot '{}': permission denied", key));
        }
        Ok(None)
    }

    fn set(&self, key: &str, _value: &str) -> Result<()> {
        if self.fail_writes {
            bail!("Failed to write slot '{}': storage quota exceeded", key);
        }
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}
