//! Status command implementation (admin only).

use std::io::Write;

use civic_lib::Status;

use crate::cli::StatusArgs;
use crate::cli::session::{Session, SessionError};
use crate::output::OutputContext;

/// Execute the status command.
///
/// # Errors
///
/// Returns `Forbidden` outside admin sessions, `InvalidStatus` for an
/// unknown status, `IssueNotFound`, or `InvalidTransition` under strict
/// transitions.
pub fn execute(
    args: &StatusArgs,
    session: &mut Session,
    out: &mut dyn Write,
    ctx: &OutputContext,
) -> Result<(), SessionError> {
    session.require_admin("status changes")?;
    let status: Status = args.status.parse()?;
    let old = session.store.get_issue(&args.id)?.status;
    let issue = session.store.update_status(&args.id, status)?;

    ctx.emit(out, &issue, |out| {
        writeln!(
            out,
            "{}: {} → {}",
            issue.id,
            old.label(),
            issue.status.label()
        )
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CivicConfig;
    use civic_lib::{CivicError, FixedGeolocator, MemoryLedger};

    fn admin_session(strict: bool) -> Session {
        let config = CivicConfig {
            admin: true,
            strict_status_transitions: strict,
            ..Default::default()
        };
        Session::with_parts(
            config,
            Box::new(MemoryLedger::new()),
            Box::new(FixedGeolocator::unavailable()),
        )
        .unwrap()
    }

    fn args(id: &str, status: &str) -> StatusArgs {
        StatusArgs {
            id: id.to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_status_change_text() {
        let mut s = admin_session(false);
        let mut out = Vec::new();
        execute(&args("civ-1", "in-progress"), &mut s, &mut out, &OutputContext::new(false)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "civ-1: Pending → In Progress\n");
        let issue = s.store().get_issue("civ-1").unwrap();
        assert_eq!(issue.status, Status::InProgress);
        assert!(issue.updated_at > issue.created_at);
    }

    #[test]
    fn test_permissive_allows_reopen() {
        let mut s = admin_session(false);
        execute(&args("civ-3", "pending"), &mut s, &mut Vec::new(), &OutputContext::new(false)).unwrap();
        assert_eq!(s.store().get_issue("civ-3").unwrap().status, Status::Pending);
    }

    #[test]
    fn test_strict_rejects_reopen() {
        let mut s = admin_session(true);
        let err = execute(&args("civ-3", "pending"), &mut s, &mut Vec::new(), &OutputContext::new(false))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Civic(CivicError::InvalidTransition { .. })
        ));
        assert_eq!(s.store().get_issue("civ-3").unwrap().status, Status::Resolved);
    }

    #[test]
    fn test_unknown_status() {
        let mut s = admin_session(false);
        let err = execute(&args("civ-1", "done"), &mut s, &mut Vec::new(), &OutputContext::new(false))
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown status 'done' (expected pending, inProgress or resolved)");
    }
}
