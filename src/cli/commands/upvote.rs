//! Upvote command implementation.

use std::io::Write;

use civic_lib::UpvoteOutcome;

use crate::cli::session::{Session, SessionError};
use crate::format::UpvoteResult;
use crate::output::OutputContext;

/// Execute the upvote command through the client's upvote guard.
///
/// # Errors
///
/// Returns `IssueNotFound` if the issue doesn't exist, or an error if the
/// ledger cannot be saved.
pub fn execute(
    id: &str,
    session: &mut Session,
    out: &mut dyn Write,
    ctx: &OutputContext,
) -> Result<(), SessionError> {
    let outcome = session.guard.upvote_once(&mut session.store, id)?;
    let result = UpvoteResult { id, outcome };

    ctx.emit(out, &result, |out| match outcome {
        UpvoteOutcome::Accepted { upvotes } => {
            writeln!(out, "Upvoted {id} ({upvotes} upvotes)")
        }
        UpvoteOutcome::AlreadyUpvoted => writeln!(out, "You already upvoted {id}"),
    })?;
    Ok(())
}
