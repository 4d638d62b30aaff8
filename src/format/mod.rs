//! Output formatting for `civic_issues`.
//!
//! Supports both human-readable text output and machine-parseable JSON.
//!
//! # JSON Output Types
//!
//! - [`IssueSummary`] - Issue with comment count (list/mine/search)
//! - [`FeedOutput`] - Filter plus ordered issues (list)
//! - [`IssueDetails`] - Issue with its event history (show)
//! - [`UpvoteResult`] - Guarded upvote outcome (upvote)
//! - [`StatsOutput`] - Aggregate stats (stats)

mod output;
mod text;

pub use output::{CommentResult, FeedOutput, IssueDetails, IssueSummary, StatsOutput, UpvoteResult};
pub use text::{
    format_issue_line, format_status_icon, format_timestamp, format_type_badge, truncate_to_width,
    write_issue_details, write_statistics,
};
