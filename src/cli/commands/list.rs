//! List command implementation.
//!
//! The feed view: applies the session's persistent filter, adjusted by
//! this call's flags, and renders the projected issues.

use std::io::Write;
use std::str::FromStr;

use civic_lib::{FilterSpec, IssueType, SortBy, Status};

use crate::cli::ListArgs;
use crate::cli::session::{Session, SessionError};
use crate::format::{FeedOutput, format_issue_line};
use crate::output::OutputContext;

/// Parse one filter dimension; `all` clears it.
fn parse_dimension<T>(value: &str) -> Result<Option<T>, SessionError>
where
    T: FromStr<Err = civic_lib::CivicError>,
{
    if value.trim().eq_ignore_ascii_case("all") {
        Ok(None)
    } else {
        Ok(Some(value.parse()?))
    }
}

/// Fold this call's flags into the session filter.
///
/// Nothing is changed unless every flag parses.
fn build_filter(args: &ListArgs, session: &Session) -> Result<FilterSpec, SessionError> {
    let mut filter = if args.reset {
        session.default_filter()
    } else {
        session.filter
    };

    if let Some(status) = &args.status {
        filter.status = parse_dimension::<Status>(status)?;
    }
    if let Some(issue_type) = &args.type_ {
        filter.issue_type = parse_dimension::<IssueType>(issue_type)?;
    }
    if let Some(sort) = &args.sort {
        filter.sort_by = SortBy::parse_lenient(sort);
        if filter.sort_by.is_none() {
            tracing::warn!(sort = %sort, "unknown sort key, showing issues in report order");
        }
    }
    Ok(filter)
}

fn describe(filter: &FilterSpec) -> String {
    format!(
        "status: {} · type: {} · sort: {}",
        filter.status.map_or("all", |s| s.as_str()),
        filter.issue_type.map_or("all", |t| t.as_str()),
        filter.sort_by.map_or("none", |s| s.as_str()),
    )
}

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if a filter value is not a known status or type.
pub fn execute(
    args: &ListArgs,
    session: &mut Session,
    out: &mut dyn Write,
    ctx: &OutputContext,
) -> Result<(), SessionError> {
    let filter = build_filter(args, session)?;
    session.filter = filter;

    let ids = session
        .feed
        .ids(session.store.version(), session.store.list_all(), &filter);
    let issues: Vec<_> = ids
        .iter()
        .filter_map(|id| session.store.get_by_id(id))
        .collect();

    let feed = FeedOutput::new(filter, issues.iter().copied());
    ctx.emit(out, &feed, |out| {
        if issues.is_empty() {
            writeln!(out, "No issues match the current filter.")?;
        } else {
            for issue in &issues {
                writeln!(out, "{}", format_issue_line(issue))?;
            }
        }
        writeln!(out, "\n{} issue(s) · {}", issues.len(), describe(&filter))
    })?;
    Ok(())
}
