//! Core domain types for the issue tracker.
//!
//! Issues carry a status, a priority, an assignee, and creation/update
//! timestamps. The wire format uses camelCase field names and kebab-case
//! enum values so persisted collections read as plain JSON records.

use crate::errors::{DevtrackError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub mod queries;

/// Assignee stamped on new issues when the caller names nobody.
pub const DEFAULT_ASSIGNEE: &str = "Current User";

/// Issue lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// Reported, nobody working on it yet
    #[default]
    Open,
    /// Being worked on
    InProgress,
    /// Finished or dismissed
    Closed,
}

impl Status {
    /// Every status, in display order.
    pub const ALL: [Status; 3] = [Status::Open, Status::InProgress, Status::Closed];

    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::InProgress => "in-progress",
            Status::Closed => "closed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = DevtrackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Status::Open),
            "in-progress" | "in_progress" | "inprogress" => Ok(Status::InProgress),
            "closed" => Ok(Status::Closed),
            _ => Err(DevtrackError::InvalidStatus(s.to_string())),
        }
    }
}

/// Issue priority level
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    /// Default for new issues
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Wire name of the priority.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = DevtrackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(DevtrackError::InvalidPriority(s.to_string())),
        }
    }
}

/// An issue representing a unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Opaque unique identifier, fixed at creation
    pub id: String,
    /// Short summary, never empty
    pub title: String,
    /// Free-form details, may be empty
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    /// Person responsible for the issue
    pub assignee: String,
    /// Set once at creation
    pub created_at: DateTime<Utc>,
    /// Rewritten on every successful mutation; never earlier than `created_at`
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// Build a fresh issue from creation data with a new UUID and
    /// `created_at == updated_at == now`.
    pub fn new(data: NewIssue) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            assignee: data.assignee,
            created_at: now,
            updated_at: now,
        }
    }

    /// First eight characters of the id, for terminal display.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((end, _)) => &self.id[..end],
            None => &self.id,
        }
    }

    /// Stamp `updated_at` with a time strictly later than `previous`.
    pub fn touch(&mut self, previous: DateTime<Utc>) {
        self.updated_at = next_timestamp(previous);
    }
}

/// Current time, bumped past `after` when the clock has not advanced.
pub fn next_timestamp(after: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > after {
        now
    } else {
        after + Duration::microseconds(1)
    }
}

/// Caller-supplied data for a new issue; id and timestamps come from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIssue {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    #[serde(default = "default_assignee")]
    pub assignee: String,
}

fn default_assignee() -> String {
    DEFAULT_ASSIGNEE.to_string()
}

impl NewIssue {
    /// Creation data with the create-dialog defaults: empty description,
    /// medium priority, open status, default assignee.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            status: Status::default(),
            assignee: default_assignee(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = assignee.into();
        self
    }
}

/// Reject titles that are empty or whitespace-only.
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(DevtrackError::validation("title", "must not be empty"));
    }
    Ok(())
}

/// Number of issues in each status bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub open: usize,
    pub in_progress: usize,
    pub closed: usize,
}

impl StatusCounts {
    /// Count for one bucket.
    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Open => self.open,
            Status::InProgress => self.in_progress,
            Status::Closed => self.closed,
        }
    }

    /// Sum over all buckets.
    pub fn total(&self) -> usize {
        self.open + self.in_progress + self.closed
    }

    pub(crate) fn record(&mut self, status: Status) {
        match status {
            Status::Open => self.open += 1,
            Status::InProgress => self.in_progress += 1,
            Status::Closed => self.closed += 1,
        }
    }
}

/// The fallback collection used when nothing usable is persisted.
///
/// Ids are "1", "2", "3" with one issue per status, newest first.
pub fn seed_issues() -> Vec<Issue> {
    vec![
        seed_issue(
            "1",
            "Fix login button alignment",
            "The login button is not properly aligned on mobile devices",
            Status::Open,
            Priority::Medium,
            "John Doe",
            ("2024-01-15T10:30:00Z", "2024-01-15T10:30:00Z"),
        ),
        seed_issue(
            "2",
            "Implement dark mode",
            "Add dark mode support across the application",
            Status::InProgress,
            Priority::High,
            "Jane Smith",
            ("2024-01-14T14:20:00Z", "2024-01-15T09:15:00Z"),
        ),
        seed_issue(
            "3",
            "Database optimization",
            "Optimize database queries for better performance",
            Status::Closed,
            Priority::Critical,
            "Mike Johnson",
            ("2024-01-13T16:45:00Z", "2024-01-15T11:00:00Z"),
        ),
    ]
}

fn seed_issue(
    id: &str,
    title: &str,
    description: &str,
    status: Status,
    priority: Priority,
    assignee: &str,
    (created, updated): (&str, &str),
) -> Issue {
    Issue {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        status,
        priority,
        assignee: assignee.to_string(),
        created_at: parse_seed_time(created),
        updated_at: parse_seed_time(updated),
    }
}

fn parse_seed_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_issue_defaults_match_create_dialog() {
        let data = NewIssue::new("Title");
        assert_eq!(data.priority, Priority::Medium);
        assert_eq!(data.status, Status::Open);
        assert_eq!(data.assignee, DEFAULT_ASSIGNEE);
        assert!(data.description.is_empty());
    }

    #[test]
    fn test_issue_new_sets_equal_timestamps() {
        let issue = Issue::new(NewIssue::new("T"));
        assert_eq!(issue.created_at, issue.updated_at);
        assert!(Uuid::parse_str(&issue.id).is_ok());
    }

    #[test]
    fn test_touch_is_strictly_monotonic() {
        let mut issue = Issue::new(NewIssue::new("T"));
        let far_future = Utc::now() + Duration::days(1);
        issue.touch(far_future);
        assert!(issue.updated_at > far_future);

        let previous = issue.updated_at;
        issue.touch(previous);
        assert!(issue.updated_at > previous);
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let back: Status = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(back, Status::Closed);
    }

    #[test]
    fn test_status_from_str_accepts_aliases() {
        assert_eq!("In-Progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("in_progress".parse::<Status>().unwrap(), Status::InProgress);
        assert!(matches!(
            "done".parse::<Status>(),
            Err(DevtrackError::InvalidStatus(s)) if s == "done"
        ));
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("CRITICAL".parse::<Priority>().unwrap(), Priority::Critical);
        assert!("urgent".parse::<Priority>().is_err());
        assert!(Priority::Critical > Priority::Low);
    }

    #[test]
    fn test_display_honors_width() {
        assert_eq!(format!("[{:<11}]", Status::Open), "[open       ]");
        assert_eq!(format!("[{:>8}]", Priority::High), "[    high]");
        assert_eq!(Status::InProgress.to_string(), "in-progress");
    }

    #[test]
    fn test_issue_serializes_camel_case() {
        let issue = &seed_issues()[0];
        let value = serde_json::to_value(issue).unwrap();
        assert_eq!(value["createdAt"], "2024-01-15T10:30:00Z");
        assert_eq!(value["updatedAt"], "2024-01-15T10:30:00Z");
        assert_eq!(value["status"], "open");
        assert_eq!(value["priority"], "medium");
    }

    #[test]
    fn test_seed_issues_are_well_formed() {
        let seeds = seed_issues();
        let ids: Vec<&str> = seeds.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        let statuses: HashSet<Status> = seeds.iter().map(|i| i.status).collect();
        assert_eq!(statuses.len(), 3);

        for issue in &seeds {
            assert!(issue.created_at <= issue.updated_at, "{}", issue.id);
            assert_ne!(issue.created_at, DateTime::<Utc>::default());
        }
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("ok").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn test_short_id() {
        let issue = Issue::new(NewIssue::new("T"));
        assert_eq!(issue.short_id().len(), 8);
        assert_eq!(seed_issues()[0].short_id(), "1");
    }

    #[test]
    fn test_new_issue_deserializes_with_defaults() {
        let data: NewIssue = serde_json::from_str(r#"{"title":"X"}"#).unwrap();
        assert_eq!(data, NewIssue::new("X"));
    }
}
