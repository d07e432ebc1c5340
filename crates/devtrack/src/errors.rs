//! Error types and actionable error formatting.
//!
//! `DevtrackError` is the library error returned synchronously to callers.
//! Load and persistence failures never appear here: the store recovers from
//! them locally and reports them to its log sink instead.
//!
//! `ActionableError` wraps a message with possible causes and remediation
//! steps for display by the command-line front end.

use std::fmt;
use thiserror::Error;

/// Errors surfaced to callers of the library.
#[derive(Error, Debug)]
pub enum DevtrackError {
    /// A field failed validation; the operation was rejected.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// No issue with this id exists.
    #[error("Issue not found: {id}")]
    NotFound { id: String },

    /// Status text did not name a known status.
    #[error("Invalid status: {0} (expected open, in-progress, or closed)")]
    InvalidStatus(String),

    /// Priority text did not name a known priority.
    #[error("Invalid priority: {0} (expected low, medium, high, or critical)")]
    InvalidPriority(String),

    /// Storage or configuration failure passed through from a backend.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result alias for library operations.
pub type Result<T> = std::result::Result<T, DevtrackError>;

impl DevtrackError {
    /// Shorthand for a validation failure on `field`.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a missing issue.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Stable machine-readable code used in JSON error output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_FAILED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidStatus(_) | Self::InvalidPriority(_) => "INVALID_ARGUMENT",
            Self::Other(_) => "EXTERNAL_ERROR",
        }
    }

    /// Attach causes and remedies for terminal display.
    pub fn to_actionable(&self) -> ActionableError {
        match self {
            Self::Validation { field, .. } if field == "title" => empty_title(),
            Self::NotFound { id } => issue_not_found(id),
            Self::InvalidStatus(_) => ActionableError::new(self.to_string())
                .with_remedy("Use one of: open, in-progress, closed (or 'all' when filtering)"),
            Self::InvalidPriority(_) => ActionableError::new(self.to_string())
                .with_remedy("Use one of: low, medium, high, critical"),
            Self::Validation { .. } | Self::Other(_) => ActionableError::new(format!("{self:#}")),
        }
    }
}

/// An error with diagnostic context and remediation steps.
///
/// # Example
///
/// ```
/// use devtrack::errors::ActionableError;
///
/// let error = ActionableError::new("Issue 42 not found")
///     .with_cause("The issue may have been deleted")
///     .with_remedy("List issues: devtrack list");
///
/// assert!(error.to_string().contains("To fix:"));
/// ```
#[derive(Debug, Clone)]
pub struct ActionableError {
    error: String,
    causes: Vec<String>,
    remediation: Vec<String>,
}

impl ActionableError {
    /// Create a new actionable error with the given message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            causes: Vec::new(),
            remediation: Vec::new(),
        }
    }

    /// Add a possible cause.
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    /// Add a remediation step.
    pub fn with_remedy(mut self, remedy: impl Into<String>) -> Self {
        self.remediation.push(remedy.into());
        self
    }

    /// Render as a multi-line message.
    pub fn to_error_message(&self) -> String {
        let mut msg = format!("Error: {}\n", self.error);

        if !self.causes.is_empty() {
            msg.push_str("\nPossible causes:\n");
            for cause in &self.causes {
                msg.push_str(&format!("  • {}\n", cause));
            }
        }

        if !self.remediation.is_empty() {
            msg.push_str("\nTo fix:\n");
            for remedy in &self.remediation {
                msg.push_str(&format!("  • {}\n", remedy));
            }
        }

        msg
    }

    /// Remediation steps, in the order they were added.
    pub fn remedies(&self) -> &[String] {
        &self.remediation
    }
}

impl fmt::Display for ActionableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_error_message())
    }
}

impl std::error::Error for ActionableError {}

/// Empty title on create or edit.
pub fn empty_title() -> ActionableError {
    ActionableError::new("Issue title must not be empty")
        .with_cause("--title was omitted, empty, or only whitespace")
        .with_remedy("Pass a title: devtrack add --title \"Fix login button\"")
}

/// Update, show, or delete on an id that is not in the collection.
pub fn issue_not_found(id: &str) -> ActionableError {
    ActionableError::new(format!("Issue {} not found", id))
        .with_cause("The issue may have been deleted")
        .with_cause("The id may be mistyped")
        .with_remedy("List issue ids: devtrack list")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actionable_error_formatting() {
        let error = ActionableError::new("Test error")
            .with_cause("First cause")
            .with_remedy("First remedy");

        let msg = error.to_error_message();

        assert!(msg.contains("Error: Test error"));
        assert!(msg.contains("Possible causes:"));
        assert!(msg.contains("• First cause"));
        assert!(msg.contains("To fix:"));
        assert!(msg.contains("• First remedy"));
    }

    #[test]
    fn test_error_without_causes() {
        let msg = ActionableError::new("Simple error")
            .with_remedy("Just fix it")
            .to_error_message();

        assert!(!msg.contains("Possible causes:"));
        assert!(msg.contains("• Just fix it"));
    }

    #[test]
    fn test_not_found_maps_to_remedy() {
        let error = DevtrackError::not_found("abc");
        assert_eq!(error.code(), "NOT_FOUND");

        let actionable = error.to_actionable();
        assert!(actionable.to_string().contains("Issue abc not found"));
        assert!(actionable.remedies()[0].contains("devtrack list"));
    }

    #[test]
    fn test_empty_title_validation_is_actionable() {
        let error = DevtrackError::validation("title", "must not be empty");
        assert_eq!(error.to_string(), "Validation failed: title: must not be empty");
        assert!(error.to_actionable().to_string().contains("--title"));
    }

    #[test]
    fn test_wrapped_anyhow_error_is_transparent() {
        let error: DevtrackError = anyhow::anyhow!("disk full").into();
        assert_eq!(error.to_string(), "disk full");
        assert_eq!(error.code(), "EXTERNAL_ERROR");
    }
}
