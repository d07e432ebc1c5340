//! Output formatting for CLI commands.
//!
//! Human-readable text by default; with `--json`, every command prints a
//! single envelope (`JsonOutput` or `JsonError`) with metadata.

use chrono::Utc;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Write as _};
use std::io::{self, Write};

use crate::domain::{Issue, Status, StatusCounts};
use crate::errors::DevtrackError;

/// Version of the JSON output format
const OUTPUT_VERSION: &str = "0.1.0";

// ============================================================================
// Output Context for Quiet Mode
// ============================================================================

/// Context for controlling output verbosity
pub struct OutputContext {
    quiet: bool,
    json: bool,
}

impl OutputContext {
    /// Create a new output context
    pub fn new(quiet: bool, json: bool) -> Self {
        Self { quiet, json }
    }

    /// Print essential output (always shown unless --json)
    pub fn print_data(&self, msg: impl Display) -> io::Result<()> {
        if !self.json {
            writeln_safe(&format!("{}", msg))
        } else {
            Ok(())
        }
    }

    /// Print success message (suppressed by --quiet or --json)
    pub fn print_success(&self, msg: impl Display) -> io::Result<()> {
        if !self.quiet && !self.json {
            writeln_safe(&format!("{}", msg))
        } else {
            Ok(())
        }
    }

    /// Print warning (suppressed by --quiet or --json)
    pub fn print_warning(&self, msg: impl Display) -> io::Result<()> {
        if !self.quiet && !self.json {
            writeln_safe_stderr(&format!("Warning: {}", msg))
        } else {
            Ok(())
        }
    }

    /// Print a JSON envelope (only with --json)
    pub fn print_json<T: Serialize>(&self, output: &JsonOutput<T>) -> io::Result<()> {
        if self.json {
            let json = output.to_json_string().map_err(io::Error::other)?;
            writeln_safe(&json)
        } else {
            Ok(())
        }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Safe println that handles broken pipes gracefully
fn writeln_safe(msg: &str) -> io::Result<()> {
    match writeln!(io::stdout(), "{}", msg) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            // Expected when piping to head, etc.
            std::process::exit(0);
        }
        Err(e) => Err(e),
    }
}

/// Safe eprintln that handles broken pipes gracefully
fn writeln_safe_stderr(msg: &str) -> io::Result<()> {
    match writeln!(io::stderr(), "{}", msg) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            std::process::exit(0);
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// JSON Output Types
// ============================================================================

/// Wrapper for successful command output with metadata
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub metadata: Metadata,
}

impl<T: Serialize> JsonOutput<T> {
    /// Create a new successful output with the given data
    pub fn success(data: T, command: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            metadata: Metadata::new(command),
        }
    }

    /// Serialize to JSON string with pretty formatting
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Wrapper for error output with suggestions
#[derive(Debug, Serialize)]
pub struct JsonError {
    pub success: bool,
    pub error: ErrorDetail,
    pub metadata: Metadata,
}

impl JsonError {
    /// Create a new error output
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                suggestions: Vec::new(),
            },
            metadata: Metadata::new(command),
        }
    }

    /// Build from a library error, carrying its remedies as suggestions.
    pub fn from_error(error: &DevtrackError, command: impl Into<String>) -> Self {
        let mut json = Self::new(error.code(), error.to_string(), command);
        json.error
            .suggestions
            .extend(error.to_actionable().remedies().iter().cloned());
        json
    }

    /// Serialize to JSON string with pretty formatting
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Error details including code, message, and suggestions
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code (e.g., "NOT_FOUND", "VALIDATION_FAILED")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Suggested actions to resolve the error
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// Metadata included in all responses
#[derive(Debug, Serialize)]
pub struct Metadata {
    /// Timestamp when the response was generated
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: chrono::DateTime<Utc>,
    /// Version of the output format
    pub version: String,
    /// Command that generated this response
    pub command: String,
}

impl Metadata {
    fn new(command: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            version: OUTPUT_VERSION.to_string(),
            command: command.into(),
        }
    }
}

fn serialize_timestamp<S>(dt: &chrono::DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339())
}

/// Payload of `list --json`.
#[derive(Debug, Serialize)]
pub struct IssueListResponse<'a> {
    pub issues: Vec<&'a Issue>,
    pub count: usize,
    pub search: &'a str,
    pub status: String,
}

/// Payload of `stats --json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub total: usize,
}

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for the devtrack CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command succeeded (0)
    Success = 0,
    /// Invalid arguments or usage error (2)
    InvalidArgument = 2,
    /// Issue not found (3)
    NotFound = 3,
    /// Validation failed, e.g. empty title (4)
    ValidationFailed = 4,
    /// Storage or configuration failure (10)
    ExternalError = 10,
}

impl ExitCode {
    /// Convert exit code to i32 for `std::process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Exit code for a library error.
    pub fn for_error(error: &DevtrackError) -> Self {
        match error {
            DevtrackError::Validation { .. } => ExitCode::ValidationFailed,
            DevtrackError::NotFound { .. } => ExitCode::NotFound,
            DevtrackError::InvalidStatus(_) | DevtrackError::InvalidPriority(_) => {
                ExitCode::InvalidArgument
            }
            DevtrackError::Other(_) => ExitCode::ExternalError,
        }
    }
}

// ============================================================================
// Text rendering
// ============================================================================

/// One line per issue: short id, status, priority, title, assignee.
pub fn format_issue_line(issue: &Issue) -> String {
    format!(
        "{:<8}  {:<11}  {:<8}  {}  ({})",
        issue.short_id(),
        issue.status,
        issue.priority,
        issue.title,
        issue.assignee
    )
}

/// Full details of one issue.
pub fn format_issue_details(issue: &Issue) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:          {}", issue.id);
    let _ = writeln!(out, "Title:       {}", issue.title);
    let _ = writeln!(out, "Status:      {}", issue.status);
    let _ = writeln!(out, "Priority:    {}", issue.priority);
    let _ = writeln!(out, "Assignee:    {}", issue.assignee);
    let _ = writeln!(out, "Created:     {}", issue.created_at.to_rfc3339());
    let _ = writeln!(out, "Updated:     {}", issue.updated_at.to_rfc3339());
    if !issue.description.is_empty() {
        let _ = writeln!(out, "\n{}", issue.description);
    }
    out.trim_end().to_string()
}

/// The dashboard stat tiles as text.
pub fn format_counts(counts: &StatusCounts) -> String {
    let mut out = String::new();
    for status in Status::ALL {
        let label = match status {
            Status::Open => "Open",
            Status::InProgress => "In Progress",
            Status::Closed => "Closed",
        };
        let _ = writeln!(out, "{:<12} {}", label, counts.get(status));
    }
    let _ = write!(out, "{:<12} {}", "Total", counts.total());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::seed_issues;

    #[test]
    fn test_json_output_envelope() {
        let output = JsonOutput::success(serde_json::json!({"count": 3}), "list");
        let value: serde_json::Value =
            serde_json::from_str(&output.to_json_string().unwrap()).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["count"], 3);
        assert_eq!(value["metadata"]["command"], "list");
        assert_eq!(value["metadata"]["version"], OUTPUT_VERSION);
    }

    #[test]
    fn test_json_error_from_not_found() {
        let error = DevtrackError::not_found("42");
        let json = JsonError::from_error(&error, "delete");
        let value: serde_json::Value =
            serde_json::from_str(&json.to_json_string().unwrap()).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "NOT_FOUND");
        assert_eq!(value["error"]["message"], "Issue not found: 42");
        assert!(value["error"]["suggestions"][0]
            .as_str()
            .unwrap()
            .contains("devtrack list"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            ExitCode::for_error(&DevtrackError::validation("title", "empty")).code(),
            4
        );
        assert_eq!(ExitCode::for_error(&DevtrackError::not_found("x")).code(), 3);
        assert_eq!(
            ExitCode::for_error(&DevtrackError::InvalidStatus("x".into())).code(),
            2
        );
        assert_eq!(
            ExitCode::for_error(&anyhow::anyhow!("disk").into()).code(),
            10
        );
    }

    #[test]
    fn test_every_failure_exit_code_is_reachable() {
        let errors = [
            DevtrackError::validation("title", "empty"),
            DevtrackError::not_found("x"),
            DevtrackError::InvalidStatus("x".into()),
            DevtrackError::InvalidPriority("x".into()),
            anyhow::anyhow!("disk").into(),
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| ExitCode::for_error(e).code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes, vec![2, 3, 4, 10]);
    }

    #[test]
    fn test_stats_response_flattens_counts() {
        let counts = StatusCounts {
            open: 2,
            in_progress: 1,
            closed: 0,
        };
        let value = serde_json::to_value(StatsResponse {
            counts,
            total: counts.total(),
        })
        .unwrap();
        assert_eq!(value["open"], 2);
        assert_eq!(value["inProgress"], 1);
        assert_eq!(value["total"], 3);
    }

    #[test]
    fn test_format_issue_line() {
        let seeds = seed_issues();
        assert_eq!(
            format_issue_line(&seeds[0]),
            "1         open         medium    Fix login button alignment  (John Doe)"
        );
        assert_eq!(
            format_issue_line(&seeds[1]),
            "2         in-progress  high      Implement dark mode  (Jane Smith)"
        );
    }

    #[test]
    fn test_format_counts() {
        let text = format_counts(&StatusCounts {
            open: 1,
            in_progress: 1,
            closed: 1,
        });
        assert!(text.contains("In Progress  1"));
        assert!(text.ends_with("Total        3"));
    }

    #[test]
    fn test_format_details_includes_description() {
        let text = format_issue_details(&seed_issues()[0]);
        assert!(text.contains("ID:          1"));
        assert!(text.ends_with("not properly aligned on mobile devices"));
    }
}
