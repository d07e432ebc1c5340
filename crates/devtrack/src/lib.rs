//! devtrack issue tracker library
//!
//! The core is [`store::IssueStore`]: an in-memory issue collection with
//! debounced persistence to a key-value slot, plus filter and aggregate
//! queries. The `devtrack` binary drives it from the command line.

pub mod cli;
pub mod config;
pub mod debounce;
pub mod domain;
pub mod errors;
pub mod output;
pub mod sink;
pub mod storage;
pub mod store;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use domain::queries::StatusFilter;
pub use domain::{Issue, NewIssue, Priority, Status, StatusCounts};
pub use errors::DevtrackError;
pub use sink::{LogSink, TracingSink};
pub use storage::{InMemoryStorage, JsonFileStorage, KeyValueStore};
pub use store::{IssueStore, LoadOutcome, StoreOptions};
