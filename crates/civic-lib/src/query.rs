//! Feed filtering and sorting.
//!
//! [`project`] turns the store's issue set plus a [`FilterSpec`] into the
//! ordered list the feed renders. It is a pure function: same input, same
//! output, no side effects.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{Issue, IssueType, Status};

/// Feed ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    /// Descending `created_at`.
    #[default]
    Newest,
    /// Ascending `created_at`.
    Oldest,
    /// Descending upvote count.
    Upvotes,
    /// Descending comment count.
    Comments,
}

impl SortBy {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Upvotes => "upvotes",
            Self::Comments => "comments",
        }
    }

    /// Parse a sort key, returning `None` for anything unrecognized.
    ///
    /// Unknown keys mean "keep input order", not an error.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" | "created" | "recent" | "created_at" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "upvotes" | "votes" | "popular" => Ok(Self::Upvotes),
            "comments" | "discussed" => Ok(Self::Comments),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

/// Declarative feed request. `None` on a dimension means no filter there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<IssueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
}

impl FilterSpec {
    /// The feed's initial state: everything, newest first.
    #[must_use]
    pub const fn feed_default() -> Self {
        Self {
            status: None,
            issue_type: None,
            sort_by: Some(SortBy::Newest),
        }
    }

    #[must_use]
    pub const fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub const fn with_type(mut self, issue_type: IssueType) -> Self {
        self.issue_type = Some(issue_type);
        self
    }

    #[must_use]
    pub const fn sorted_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = Some(sort_by);
        self
    }

    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        self.status.is_none_or(|s| issue.status == s)
            && self.issue_type.is_none_or(|t| issue.issue_type == t)
    }
}

/// Filter then stable-sort `issues` according to `spec`.
///
/// Ties keep their relative input order, so equal-ranked issues do not
/// shuffle between renders.
#[must_use]
pub fn project<'a>(issues: &'a [Issue], spec: &FilterSpec) -> Vec<&'a Issue> {
    let mut results: Vec<&Issue> = issues.iter().filter(|i| spec.matches(i)).collect();
    if let Some(sort_by) = spec.sort_by {
        sort_issues(&mut results, sort_by);
    }
    results
}

/// Owned variant of [`project`] for callers that outlive the borrow.
#[must_use]
pub fn project_owned(issues: &[Issue], spec: &FilterSpec) -> Vec<Issue> {
    project(issues, spec).into_iter().cloned().collect()
}

// `sort_by_key` is a stable sort.
fn sort_issues(issues: &mut [&Issue], sort_by: SortBy) {
    match sort_by {
        SortBy::Newest => issues.sort_by_key(|i| Reverse(i.created_at)),
        SortBy::Oldest => issues.sort_by_key(|i| i.created_at),
        SortBy::Upvotes => issues.sort_by_key(|i| Reverse(i.upvotes)),
        SortBy::Comments => issues.sort_by_key(|i| Reverse(i.comments.len())),
    }
}

/// Memoized projection keyed on `(store version, spec)`.
///
/// Holds ids rather than issues so a stale cache can never hand back
/// out-of-date issue contents.
#[derive(Debug, Default)]
pub struct CachedProjection {
    key: Option<(u64, FilterSpec)>,
    ids: Vec<String>,
}

impl CachedProjection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered ids for `spec`, recomputed only when `version` or `spec`
    /// differs from the last call.
    pub fn ids(&mut self, version: u64, issues: &[Issue], spec: &FilterSpec) -> &[String] {
        if self.key != Some((version, *spec)) {
            tracing::trace!(version, "recomputing feed projection");
            self.ids = project(issues, spec).into_iter().map(|i| i.id.clone()).collect();
            self.key = Some((version, *spec));
        }
        &self.ids
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }

    #[must_use]
    pub const fn is_warm(&self) -> bool {
        self.key.is_some()
    }
}
