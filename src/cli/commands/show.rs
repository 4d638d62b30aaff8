//! Show command implementation.

use std::io::Write;

use crate::cli::session::{Session, SessionError};
use crate::format::{IssueDetails, format_timestamp, write_issue_details};
use crate::output::OutputContext;

/// Execute the show command.
///
/// # Errors
///
/// Returns `IssueNotFound` if the issue doesn't exist.
pub fn execute(
    id: &str,
    session: &mut Session,
    out: &mut dyn Write,
    ctx: &OutputContext,
) -> Result<(), SessionError> {
    let issue = session.store.get_issue(id)?;
    let details = IssueDetails {
        issue,
        events: session.store.get_events(id),
    };

    ctx.emit(out, &details, |out| {
        write_issue_details(out, details.issue)?;
        if !details.events.is_empty() {
            writeln!(out)?;
            writeln!(out, "History:")?;
            for event in &details.events {
                let change = match (&event.old_value, &event.new_value) {
                    (Some(old), Some(new)) => format!(" {old} → {new}"),
                    (None, Some(new)) => format!(" {new}"),
                    _ => String::new(),
                };
                writeln!(
                    out,
                    "  {} {}{change}",
                    format_timestamp(event.created_at),
                    event.event_type
                )?;
            }
        }
        Ok(())
    })?;
    Ok(())
}
