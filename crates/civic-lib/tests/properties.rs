use std::collections::HashSet;

use chrono::{Duration, TimeZone, Utc};
use civic_lib::{
    CommentDraft, FilterSpec, Issue, IssueDraft, IssueStore, IssueType, Location, SortBy, Status,
    project,
};
use proptest::prelude::*;

fn draft(title: &str) -> IssueDraft {
    IssueDraft {
        title: title.to_string(),
        description: "reported via property test".to_string(),
        issue_type: IssueType::Other,
        location: Location::new(40.71, -74.0),
        reported_by: "prop".to_string(),
        ..Default::default()
    }
}

fn arb_status() -> impl Strategy<Value = Status> {
    prop::sample::select(Status::ALL.to_vec())
}

fn arb_type() -> impl Strategy<Value = IssueType> {
    prop::sample::select(IssueType::ALL.to_vec())
}

prop_compose! {
    fn arb_issue()(
        status in arb_status(),
        issue_type in arb_type(),
        upvotes in 0u64..30,
        minutes in 0i64..10_000,
        comments in 0usize..5,
    ) -> (Status, IssueType, u64, i64, usize) {
        (status, issue_type, upvotes, minutes, comments)
    }
}

fn build(specs: &[(Status, IssueType, u64, i64, usize)]) -> Vec<Issue> {
    let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    specs
        .iter()
        .enumerate()
        .map(|(n, &(status, issue_type, upvotes, minutes, comments))| {
            let id = format!("civ-{n}");
            let created_at = base + Duration::minutes(minutes);
            Issue {
                id: id.clone(),
                title: format!("issue {n}"),
                description: "d".to_string(),
                issue_type,
                status,
                location: Location::new(1.0, 1.0),
                media: vec![],
                upvotes,
                created_at,
                updated_at: created_at,
                comments: (0..comments)
                    .map(|k| civic_lib::Comment {
                        id: i64::try_from(n * 10 + k).unwrap(),
                        issue_id: id.clone(),
                        author: "a".to_string(),
                        is_admin: false,
                        content: "c".to_string(),
                        created_at,
                    })
                    .collect(),
                reported_by: "r".to_string(),
            }
        })
        .collect()
}

fn position(issues: &[Issue], id: &str) -> usize {
    issues.iter().position(|i| i.id == id).unwrap()
}

proptest! {
    #[test]
    fn created_ids_are_distinct(titles in prop::collection::vec("[a-z]{0,3}x", 1..60)) {
        let mut store = IssueStore::new();
        let mut seen = HashSet::new();
        for title in &titles {
            let issue = store.create_issue(draft(title)).unwrap();
            prop_assert!(seen.insert(issue.id));
        }
        prop_assert_eq!(seen.len(), titles.len());
    }

    #[test]
    fn upvote_n_times_adds_n(n in 0u64..50) {
        let mut store = IssueStore::new();
        let id = store.create_issue(draft("pothole")).unwrap().id;
        let other = store.create_issue(draft("other")).unwrap().id;
        for _ in 0..n {
            store.upvote(&id).unwrap();
        }
        prop_assert_eq!(store.get_issue(&id).unwrap().upvotes, n);
        prop_assert_eq!(store.get_issue(&other).unwrap().upvotes, 0);
    }

    #[test]
    fn blank_comments_never_land(content in "[ \t\n]{0,8}") {
        let mut store = IssueStore::new();
        let id = store.create_issue(draft("quiet")).unwrap().id;
        let before = store.get_issue(&id).unwrap().clone();
        prop_assert!(store.add_comment(&id, CommentDraft::citizen("You", content)).is_err());
        prop_assert_eq!(store.get_issue(&id).unwrap(), &before);
    }

    #[test]
    fn upvote_sort_is_non_increasing_and_stable(specs in prop::collection::vec(arb_issue(), 0..40)) {
        let issues = build(&specs);
        let sorted = project(&issues, &FilterSpec::default().sorted_by(SortBy::Upvotes));
        prop_assert_eq!(sorted.len(), issues.len());
        for pair in sorted.windows(2) {
            prop_assert!(pair[0].upvotes >= pair[1].upvotes);
            if pair[0].upvotes == pair[1].upvotes {
                prop_assert!(position(&issues, &pair[0].id) < position(&issues, &pair[1].id));
            }
        }
    }

    #[test]
    fn date_and_comment_sorts_are_ordered(specs in prop::collection::vec(arb_issue(), 0..40)) {
        let issues = build(&specs);
        let newest = project(&issues, &FilterSpec::default().sorted_by(SortBy::Newest));
        prop_assert!(newest.windows(2).all(|p| p[0].created_at >= p[1].created_at));
        let oldest = project(&issues, &FilterSpec::default().sorted_by(SortBy::Oldest));
        prop_assert!(oldest.windows(2).all(|p| p[0].created_at <= p[1].created_at));
        let discussed = project(&issues, &FilterSpec::default().sorted_by(SortBy::Comments));
        prop_assert!(discussed.windows(2).all(|p| p[0].comments.len() >= p[1].comments.len()));
    }

    #[test]
    fn status_filter_is_exact(specs in prop::collection::vec(arb_issue(), 0..40), status in arb_status()) {
        let issues = build(&specs);
        let filtered = project(&issues, &FilterSpec::default().with_status(status));
        prop_assert!(filtered.iter().all(|i| i.status == status));
        let expected = issues.iter().filter(|i| i.status == status).count();
        prop_assert_eq!(filtered.len(), expected);
    }

    #[test]
    fn type_filter_composes_with_status(
        specs in prop::collection::vec(arb_issue(), 0..40),
        status in arb_status(),
        issue_type in arb_type(),
    ) {
        let issues = build(&specs);
        let spec = FilterSpec::default().with_status(status).with_type(issue_type);
        let filtered = project(&issues, &spec);
        let expected: Vec<&str> = issues
            .iter()
            .filter(|i| i.status == status && i.issue_type == issue_type)
            .map(|i| i.id.as_str())
            .collect();
        let got: Vec<&str> = filtered.iter().map(|i| i.id.as_str()).collect();
        prop_assert_eq!(got, expected);
    }
}
