//! Comment command implementation.

use std::io::Write;

use civic_lib::CommentDraft;

use crate::cli::CommentArgs;
use crate::cli::session::{Session, SessionError};
use crate::format::CommentResult;
use crate::output::OutputContext;

/// Execute the comment command.
///
/// `--official` marks an administrator response and is ignored outside
/// admin sessions.
///
/// # Errors
///
/// Returns `IssueNotFound` if the issue doesn't exist, or a validation
/// error for blank text.
pub fn execute(
    args: &CommentArgs,
    session: &mut Session,
    out: &mut dyn Write,
    ctx: &OutputContext,
) -> Result<(), SessionError> {
    let content = args.text.join(" ");
    let author = session.config.user.clone();

    let official = args.official && session.config.admin;
    if args.official && !official {
        tracing::warn!(issue_id = %args.id, "--official ignored outside an admin session");
    }
    let draft = if official {
        CommentDraft::official(author, content)
    } else {
        CommentDraft::citizen(author, content)
    };

    let comment = session.store.add_comment(&args.id, draft)?;
    let result = CommentResult { comment: &comment };
    ctx.emit(out, &result, |out| {
        let kind = if comment.is_admin {
            "official response"
        } else {
            "comment"
        };
        writeln!(out, "Added {kind} to {}", comment.issue_id)
    })?;
    Ok(())
}
