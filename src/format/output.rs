use civic_lib::{Comment, Event, FilterSpec, Issue, Statistics, UpvoteOutcome};
use serde::Serialize;

/// Issue with its comment count, for feed views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueSummary<'a> {
    #[serde(flatten)]
    pub issue: &'a Issue,
    pub comment_count: usize,
}

impl<'a> From<&'a Issue> for IssueSummary<'a> {
    fn from(issue: &'a Issue) -> Self {
        Self {
            issue,
            comment_count: issue.comment_count(),
        }
    }
}

/// A rendered feed: the filter that produced it plus the ordered issues.
#[derive(Debug, Clone, Serialize)]
pub struct FeedOutput<'a> {
    pub filter: FilterSpec,
    pub count: usize,
    pub issues: Vec<IssueSummary<'a>>,
}

impl<'a> FeedOutput<'a> {
    #[must_use]
    pub fn new(filter: FilterSpec, issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let issues: Vec<IssueSummary<'a>> = issues.into_iter().map(IssueSummary::from).collect();
        Self {
            filter,
            count: issues.len(),
            issues,
        }
    }
}

/// Issue details with its history, for the show view.
#[derive(Debug, Clone, Serialize)]
pub struct IssueDetails<'a> {
    #[serde(flatten)]
    pub issue: &'a Issue,
    pub events: Vec<&'a Event>,
}

/// Result of a guarded upvote.
#[derive(Debug, Clone, Serialize)]
pub struct UpvoteResult<'a> {
    pub id: &'a str,
    #[serde(flatten)]
    pub outcome: UpvoteOutcome,
}

/// A newly posted comment.
#[derive(Debug, Clone, Serialize)]
pub struct CommentResult<'a> {
    #[serde(flatten)]
    pub comment: &'a Comment,
}

/// Aggregate statistics with the derived resolution rate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOutput {
    #[serde(flatten)]
    pub stats: Statistics,
    pub resolution_rate: f64,
}

impl From<Statistics> for StatsOutput {
    fn from(stats: Statistics) -> Self {
        let resolution_rate = stats.resolution_rate();
        Self {
            stats,
            resolution_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_lib::seed::sample_issues;

    #[test]
    fn test_feed_output_shape() {
        let issues = sample_issues();
        let feed = FeedOutput::new(FilterSpec::feed_default(), &issues[..2]);
        let value = serde_json::to_value(&feed).unwrap();
        assert_eq!(value["count"], 2);
        assert_eq!(value["filter"]["sortBy"], "newest");
        assert_eq!(value["issues"][0]["id"], "civ-1");
        assert_eq!(value["issues"][0]["type"], "pothole");
        assert_eq!(value["issues"][0]["commentCount"], 1);
        assert_eq!(value["issues"][1]["status"], "inProgress");
    }

    #[test]
    fn test_upvote_result_shape() {
        let accepted = UpvoteResult {
            id: "civ-1",
            outcome: UpvoteOutcome::Accepted { upvotes: 16 },
        };
        insta::assert_json_snapshot!(accepted, @r#"
        {
          "id": "civ-1",
          "outcome": "accepted",
          "upvotes": 16
        }
        "#);
        let repeat = UpvoteResult {
            id: "civ-1",
            outcome: UpvoteOutcome::AlreadyUpvoted,
        };
        insta::assert_json_snapshot!(repeat, @r#"
        {
          "id": "civ-1",
          "outcome": "already_upvoted"
        }
        "#);
    }

    #[test]
    fn test_stats_output_shape() {
        let out = StatsOutput::from(Statistics::collect(&sample_issues()));
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["total"], 4);
        assert_eq!(value["totalUpvotes"], 55);
        assert_eq!(value["inProgress"], 1);
        assert!((value["resolutionRate"].as_f64().unwrap() - 0.25).abs() < 1e-9);
    }
}
