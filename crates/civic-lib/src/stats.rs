//! Aggregate counters for the admin dashboard and profile views.

use serde::{Deserialize, Serialize};

use crate::model::{Issue, Status};

/// Aggregate statistics over a set of issues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub total_upvotes: u64,
    pub total_comments: usize,
    pub citizen_comments: usize,
    pub official_comments: usize,
}

impl Statistics {
    /// Tally counters over `issues`.
    #[must_use]
    pub fn collect<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let mut stats = Self::default();
        for issue in issues {
            stats.total += 1;
            match issue.status {
                Status::Pending => stats.pending += 1,
                Status::InProgress => stats.in_progress += 1,
                Status::Resolved => stats.resolved += 1,
            }
            stats.total_upvotes = stats.total_upvotes.saturating_add(issue.upvotes);
            stats.total_comments += issue.comments.len();
            let official = issue.comments.iter().filter(|c| c.is_admin).count();
            stats.official_comments += official;
            stats.citizen_comments += issue.comments.len() - official;
        }
        stats
    }

    /// Count for one status.
    #[must_use]
    pub const fn count(&self, status: Status) -> usize {
        match status {
            Status::Pending => self.pending,
            Status::InProgress => self.in_progress,
            Status::Resolved => self.resolved,
        }
    }

    /// Share of issues resolved, 0.0 for an empty set.
    #[must_use]
    pub fn resolution_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.resolved as f64 / self.total as f64
        }
    }
}
