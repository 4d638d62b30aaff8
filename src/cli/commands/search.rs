//! Search command implementation.

use std::io::Write;

use crate::cli::SearchArgs;
use crate::cli::session::{Session, SessionError};
use crate::format::{IssueSummary, format_issue_line};
use crate::output::OutputContext;

/// Execute the search command over titles, descriptions and addresses.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn execute(
    args: &SearchArgs,
    session: &mut Session,
    out: &mut dyn Write,
    ctx: &OutputContext,
) -> Result<(), SessionError> {
    let query = args.query.join(" ");
    let matches: Vec<IssueSummary<'_>> = session
        .store
        .search_issues(&query)
        .into_iter()
        .map(IssueSummary::from)
        .collect();

    ctx.emit(out, &matches, |out| {
        if matches.is_empty() {
            return writeln!(out, "No issues match {query:?}.");
        }
        for summary in &matches {
            writeln!(out, "{}", format_issue_line(summary.issue))?;
        }
        Ok(())
    })?;
    Ok(())
}
