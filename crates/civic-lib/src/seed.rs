//! Demonstration feed loaded into a fresh session.

use chrono::{DateTime, TimeZone, Utc};

use crate::model::{Comment, Issue, IssueType, Location, Status};

fn at(day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, day, hour, min, 0)
        .single()
        .unwrap_or_default()
}

fn comment(id: i64, issue_id: &str, author: &str, is_admin: bool, content: &str, created_at: DateTime<Utc>) -> Comment {
    Comment {
        id,
        issue_id: issue_id.to_string(),
        author: author.to_string(),
        is_admin,
        content: content.to_string(),
        created_at,
    }
}

/// Four neighbourhood reports with their discussion threads.
#[must_use]
pub fn sample_issues() -> Vec<Issue> {
    vec![
        Issue {
            id: "civ-1".to_string(),
            title: "Large Pothole on Main Street".to_string(),
            description: "Deep pothole causing vehicle damage near the intersection of Main St. and 5th Ave.".to_string(),
            issue_type: IssueType::Pothole,
            status: Status::Pending,
            location: Location::new(40.7128, -74.006).with_address("Main St. & 5th Ave."),
            media: vec!["/placeholder.svg".to_string()],
            upvotes: 15,
            created_at: at(10, 14, 30),
            updated_at: at(11, 9, 15),
            comments: vec![comment(
                101,
                "civ-1",
                "Jane Smith",
                false,
                "This pothole damaged my car tire last week!",
                at(11, 9, 15),
            )],
            reported_by: "John Doe".to_string(),
        },
        Issue {
            id: "civ-2".to_string(),
            title: "Broken Street Light".to_string(),
            description: "Street light has been out for over a week, creating safety concerns at night.".to_string(),
            issue_type: IssueType::Streetlight,
            status: Status::InProgress,
            location: Location::new(40.7145, -74.0071).with_address("Oak Street near Central Park"),
            media: vec!["/placeholder.svg".to_string()],
            upvotes: 8,
            created_at: at(9, 10, 20),
            updated_at: at(11, 16, 45),
            comments: vec![comment(
                102,
                "civ-2",
                "CityAdmin",
                true,
                "Maintenance team has been dispatched to investigate and repair.",
                at(11, 16, 45),
            )],
            reported_by: "Sarah Johnson".to_string(),
        },
        Issue {
            id: "civ-3".to_string(),
            title: "Garbage Overflow".to_string(),
            description: "Public garbage bins overflowing near the community center.".to_string(),
            issue_type: IssueType::Garbage,
            status: Status::Resolved,
            location: Location::new(40.7112, -74.0059).with_address("Community Center, Pine Street"),
            media: vec!["/placeholder.svg".to_string()],
            upvotes: 12,
            created_at: at(8, 8, 15),
            updated_at: at(12, 11, 30),
            comments: vec![
                comment(
                    103,
                    "civ-3",
                    "Robert Brown",
                    false,
                    "This has been happening every weekend! Please increase collection frequency.",
                    at(9, 14, 25),
                ),
                comment(
                    104,
                    "civ-3",
                    "CityAdmin",
                    true,
                    "Issue resolved. We have increased the collection schedule to twice daily on weekends.",
                    at(12, 11, 30),
                ),
            ],
            reported_by: "Michael Wilson".to_string(),
        },
        Issue {
            id: "civ-4".to_string(),
            title: "Water Main Leak".to_string(),
            description: "Water leaking from street, possibly a broken pipe.".to_string(),
            issue_type: IssueType::WaterLeak,
            status: Status::Pending,
            location: Location::new(40.7136, -74.0046).with_address("Maple Street between 3rd and 4th"),
            media: vec!["/placeholder.svg".to_string()],
            upvotes: 20,
            created_at: at(11, 17, 30),
            updated_at: at(11, 17, 30),
            comments: vec![],
            reported_by: "Emily Davis".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::IssueStore;

    #[test]
    fn test_sample_issues_import_cleanly() {
        let store = IssueStore::with_issues(sample_issues()).unwrap();
        assert_eq!(store.len(), 4);
        assert_eq!(store.get_issue("civ-3").unwrap().comments.len(), 2);
    }

    #[test]
    fn test_sample_timestamps_consistent() {
        for issue in sample_issues() {
            assert!(issue.updated_at >= issue.created_at, "{}", issue.id);
            for c in &issue.comments {
                assert!(c.created_at >= issue.created_at);
                assert!(c.created_at <= issue.updated_at);
            }
        }
    }
}
