//! Mine command implementation (profile view).

use std::io::Write;

use serde::Serialize;

use crate::cli::session::{Session, SessionError};
use crate::format::{IssueSummary, format_issue_line};
use crate::output::OutputContext;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileOutput<'a> {
    user: &'a str,
    reported: Vec<IssueSummary<'a>>,
    comments_posted: usize,
    upvoted: usize,
}

/// Execute the mine command: the session user's reports and activity.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn execute(
    session: &mut Session,
    out: &mut dyn Write,
    ctx: &OutputContext,
) -> Result<(), SessionError> {
    let user = session.config.user.as_str();
    let reported: Vec<_> = session
        .store
        .reported_by(user)
        .into_iter()
        .map(IssueSummary::from)
        .collect();
    let comments_posted = session
        .store
        .list_all()
        .iter()
        .flat_map(|issue| &issue.comments)
        .filter(|c| c.author.eq_ignore_ascii_case(user))
        .count();

    let profile = ProfileOutput {
        user,
        reported,
        comments_posted,
        upvoted: session.guard.ledger().len(),
    };

    ctx.emit(out, &profile, |out| {
        writeln!(out, "{}", profile.user)?;
        writeln!(
            out,
            "Reported: {}  Comments: {}  Upvoted: {}",
            profile.reported.len(),
            profile.comments_posted,
            profile.upvoted
        )?;
        if !profile.reported.is_empty() {
            writeln!(out)?;
            for summary in &profile.reported {
                writeln!(out, "{}", format_issue_line(summary.issue))?;
            }
        }
        Ok(())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CivicConfig;
    use civic_lib::{FixedGeolocator, MemoryLedger};

    fn session_as(user: &str) -> Session {
        let config = CivicConfig {
            user: user.to_string(),
            ..Default::default()
        };
        Session::with_parts(
            config,
            Box::new(MemoryLedger::new()),
            Box::new(FixedGeolocator::unavailable()),
        )
        .unwrap()
    }

    #[test]
    fn test_profile_of_seed_reporter() {
        let mut s = session_as("john doe");
        let mut out = Vec::new();
        execute(&mut s, &mut out, &OutputContext::new(true)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["reported"][0]["id"], "civ-1");
        assert_eq!(value["commentsPosted"], 0);
        assert_eq!(value["upvoted"], 0);
    }

    #[test]
    fn test_profile_counts_comments() {
        let mut s = session_as("CityAdmin");
        let mut out = Vec::new();
        execute(&mut s, &mut out, &OutputContext::new(false)).unwrap();
        insta::assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        CityAdmin
        Reported: 0  Comments: 2  Upvoted: 0
        ");
    }
}
