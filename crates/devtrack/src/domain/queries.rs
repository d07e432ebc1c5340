//! Pure query operations on issue collections.
//!
//! These functions operate on slices of issues without touching storage and
//! preserve the order of the slice they are given.

use crate::domain::{Issue, Status, StatusCounts};
use crate::errors::{DevtrackError, Result};
use std::fmt;
use std::str::FromStr;

/// Status restriction for a filter query: everything, or a single status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    /// Whether an issue with `status` passes this filter.
    pub fn matches(self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl From<Status> for StatusFilter {
    fn from(status: Status) -> Self {
        StatusFilter::Only(status)
    }
}

impl FromStr for StatusFilter {
    type Err = DevtrackError;

    /// Parses `"all"` or any status name.
    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse::<Status>().map(StatusFilter::Only)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => status.fmt(f),
        }
    }
}

/// Whether `issue` contains `needle` in its title or description, ignoring
/// case. `needle` must already be lowercase; an empty needle matches.
fn matches_search(issue: &Issue, needle: &str) -> bool {
    needle.is_empty()
        || issue.title.to_lowercase().contains(needle)
        || issue.description.to_lowercase().contains(needle)
}

/// Issues passing both the status filter and the search term, in slice order.
pub fn filter_issues<'a>(issues: &'a [Issue], search: &str, status: StatusFilter) -> Vec<&'a Issue> {
    let needle = search.to_lowercase();
    issues
        .iter()
        .filter(|issue| status.matches(issue.status) && matches_search(issue, &needle))
        .collect()
}

/// Count issues per status over the whole slice.
pub fn count_by_status(issues: &[Issue]) -> StatusCounts {
    issues.iter().fold(StatusCounts::default(), |mut counts, issue| {
        counts.record(issue.status);
        counts
    })
}
