//! The issue store: owns the canonical collection, persists it with
//! debounced writes, and answers filter and aggregate queries.
//!
//! All operations are synchronous. The only deferred work is the pending
//! persistence write, which runs on the tokio runtime after a quiet interval
//! and is replaced whenever another mutation happens first.
//!
//! # Example
//!
//! ```
//! use devtrack::domain::NewIssue;
//! use devtrack::sink::TracingSink;
//! use devtrack::storage::InMemoryStorage;
//! use devtrack::store::{IssueStore, StoreOptions};
//!
//! let mut store = IssueStore::open(InMemoryStorage::new(), TracingSink, StoreOptions::default());
//! assert!(!store.is_loading());
//!
//! let issue = store.add_issue(NewIssue::new("Fix flaky test")).unwrap();
//! assert_eq!(store.issues()[0].id, issue.id);
//! assert_eq!(store.aggregate_counts().total(), 4);
//! ```

use crate::debounce::Debouncer;
use crate::domain::queries::{count_by_status, filter_issues, StatusFilter};
use crate::domain::{seed_issues, validate_title, Issue, NewIssue, StatusCounts};
use crate::errors::Result;
use crate::sink::LogSink;
use crate::storage::{KeyValueStore, DEFAULT_STORAGE_KEY};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Quiet interval before a pending write is flushed to storage.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Construction options for an [`IssueStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Storage slot holding the collection.
    pub key: String,
    /// Quiet interval for debounced writes.
    pub debounce: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// How initialization obtained the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A persisted collection of this many issues was restored.
    Restored(usize),
    /// Nothing was persisted; the seed set was installed.
    Seeded,
    /// Persisted data was unreadable or unparseable; the seed set was
    /// installed and the failure reported to the log sink.
    Recovered,
}

/// Authoritative in-memory issue collection with best-effort persistence.
///
/// The collection is ordered newest-created first. Mutations schedule a
/// debounced write of the whole collection; write failures go to the log
/// sink and never roll back the in-memory change.
pub struct IssueStore<S, L> {
    storage: Arc<S>,
    sink: Arc<L>,
    key: String,
    issues: Vec<Issue>,
    loading: bool,
    debouncer: Debouncer,
}

impl<S, L> IssueStore<S, L>
where
    S: KeyValueStore + 'static,
    L: LogSink + 'static,
{
    /// Create a store in the loading state with an empty collection.
    ///
    /// Call [`load`](Self::load) to initialize it, or use
    /// [`open`](Self::open) to do both.
    pub fn new(storage: S, sink: L, options: StoreOptions) -> Self {
        Self {
            storage: Arc::new(storage),
            sink: Arc::new(sink),
            key: options.key,
            issues: Vec::new(),
            loading: true,
            debouncer: Debouncer::new(options.debounce),
        }
    }

    /// Create and initialize a store.
    pub fn open(storage: S, sink: L, options: StoreOptions) -> Self {
        let mut store = Self::new(storage, sink, options);
        store.load();
        store
    }

    /// Load the persisted collection, falling back to the seed set.
    ///
    /// Replaces whatever the collection held while loading and clears the
    /// loading flag. Never schedules a write. Returns `None` if the store has
    /// already been initialized.
    pub fn load(&mut self) -> Option<LoadOutcome> {
        if !self.loading {
            return None;
        }

        let outcome = match self.read_persisted() {
            Ok(Some(issues)) => {
                let count = issues.len();
                self.issues = issues;
                debug!(key = %self.key, count, "Restored persisted issues");
                LoadOutcome::Restored(count)
            }
            Ok(None) => {
                self.issues = seed_issues();
                debug!(key = %self.key, "No persisted issues; using seed data");
                LoadOutcome::Seeded
            }
            Err(e) => {
                warn!(key = %self.key, "Persisted issues unusable; using seed data");
                self.sink.load_failed(&self.key, &e);
                self.issues = seed_issues();
                LoadOutcome::Recovered
            }
        };

        self.loading = false;
        Some(outcome)
    }

    fn read_persisted(&self) -> anyhow::Result<Option<Vec<Issue>>> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(None);
        };
        let issues = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse persisted issues under '{}'", self.key))?;
        Ok(Some(issues))
    }

    /// True until initialization completes.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The collection, newest-created first.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Look up an issue by id.
    pub fn get(&self, id: &str) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.id == id)
    }

    /// Storage slot this store persists to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Create an issue and prepend it to the collection.
    ///
    /// The store assigns a fresh id and sets `created_at == updated_at == now`.
    ///
    /// # Errors
    ///
    /// Returns a validation error, leaving the collection unchanged, if the
    /// title is empty or whitespace-only.
    pub fn add_issue(&mut self, data: NewIssue) -> Result<Issue> {
        validate_title(&data.title)?;

        let mut issue = Issue::new(data);
        while self.get(&issue.id).is_some() {
            issue.id = Uuid::new_v4().to_string();
        }

        self.issues.insert(0, issue.clone());
        debug!(id = %issue.id, "Added issue");
        self.schedule_write();
        Ok(issue)
    }

    /// Replace the stored issue with the same id.
    ///
    /// Every field except `id` and `created_at` is taken from `issue`;
    /// `updated_at` is forced to a time strictly later than its previous
    /// value. Returns the stored result, or `None` (collection unchanged) when
    /// no issue has that id.
    pub fn update_issue(&mut self, issue: Issue) -> Option<Issue> {
        let Some(slot) = self.issues.iter_mut().find(|i| i.id == issue.id) else {
            debug!(id = %issue.id, "Ignoring update for unknown issue");
            return None;
        };

        let previous = slot.updated_at;
        let created_at = slot.created_at;
        *slot = Issue { created_at, ..issue };
        slot.touch(previous);

        let updated = slot.clone();
        debug!(id = %updated.id, "Updated issue");
        self.schedule_write();
        Some(updated)
    }

    /// Remove the issue with this id. Returns false (collection unchanged)
    /// when no issue has that id.
    pub fn delete_issue(&mut self, id: &str) -> bool {
        let before = self.issues.len();
        self.issues.retain(|issue| issue.id != id);
        if self.issues.len() == before {
            debug!(id, "Ignoring delete for unknown issue");
            return false;
        }

        debug!(id, "Deleted issue");
        self.schedule_write();
        true
    }

    /// Issues matching the status filter and, case-insensitively, the search
    /// term in title or description. Computed on every call, in store order.
    pub fn filter(&self, search: &str, status: StatusFilter) -> Vec<&Issue> {
        filter_issues(&self.issues, search, status)
    }

    /// Per-status counts over the full collection.
    pub fn aggregate_counts(&self) -> StatusCounts {
        count_by_status(&self.issues)
    }

    /// Whether a debounced write is waiting to run.
    pub fn has_pending_write(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Cancel the pending write, if any, and perform it immediately.
    ///
    /// Failures are reported to the log sink and also returned, so a caller
    /// about to exit can tell the user nothing was saved.
    pub fn flush(&mut self) -> Result<()> {
        if !self.debouncer.cancel() {
            return Ok(());
        }
        persist(&*self.storage, &*self.sink, &self.key, &self.issues)?;
        Ok(())
    }

    /// Cancel any pending write, clear the storage slot, and reinstall the
    /// seed set, as if nothing had ever been persisted.
    pub fn reset(&mut self) -> Result<()> {
        self.debouncer.cancel();
        self.storage.remove(&self.key)?;
        self.issues = seed_issues();
        self.loading = false;
        debug!(key = %self.key, "Cleared persisted issues");
        Ok(())
    }

    fn schedule_write(&mut self) {
        if self.loading {
            return;
        }

        let storage = Arc::clone(&self.storage);
        let sink = Arc::clone(&self.sink);
        let key = self.key.clone();
        let snapshot = self.issues.clone();
        let write = move || {
            // Failures are already reported to the sink
            let _ = persist(&*storage, &*sink, &key, &snapshot);
        };

        if let Err(write) = self.debouncer.schedule(write) {
            debug!(key = %self.key, "No async runtime; writing through");
            write();
        }
    }
}

/// Serialize `issues` into the slot, reporting any failure to `sink`.
fn persist<S, L>(storage: &S, sink: &L, key: &str, issues: &[Issue]) -> anyhow::Result<()>
where
    S: KeyValueStore + ?Sized,
    L: LogSink + ?Sized,
{
    let result = serde_json::to_string(issues)
        .context("Failed to serialize issues")
        .and_then(|json| storage.set(key, &json));

    match &result {
        Ok(()) => debug!(key, count = issues.len(), "Persisted issues"),
        Err(e) => sink.write_failed(key, e),
    }
    result
}
