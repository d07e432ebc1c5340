//! Log sink for failures the store recovers from on its own.
//!
//! Load and persistence failures never reach the caller of a store
//! operation; they are reported here, fire-and-forget.

use anyhow::Error;

/// Receiver for recovered load and persistence failures.
pub trait LogSink: Send + Sync {
    /// Persisted data under `key` was unreadable or unparseable; the store
    /// fell back to seed data.
    fn load_failed(&self, key: &str, error: &Error);

    /// Writing the collection to `key` failed; in-memory state is unaffected.
    fn write_failed(&self, key: &str, error: &Error);
}

/// Default sink: emits `tracing` error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn load_failed(&self, key: &str, error: &Error) {
        tracing::error!(key, error = %format!("{error:#}"), "Error loading issues");
    }

    fn write_failed(&self, key: &str, error: &Error) {
        tracing::error!(key, error = %format!("{error:#}"), "Error saving issues");
    }
}

impl<L: LogSink + ?Sized> LogSink for std::sync::Arc<L> {
    fn load_failed(&self, key: &str, error: &Error) {
        (**self).load_failed(key, error);
    }

    fn write_failed(&self, key: &str, error: &Error) {
        (**self).write_failed(key, error);
    }
}
