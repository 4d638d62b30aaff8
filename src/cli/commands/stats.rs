//! Stats command implementation (dashboard summary).

use std::io::Write;

use crate::cli::session::{Session, SessionError};
use crate::format::{StatsOutput, write_statistics};
use crate::output::OutputContext;

/// Execute the stats command.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn execute(
    session: &mut Session,
    out: &mut dyn Write,
    ctx: &OutputContext,
) -> Result<(), SessionError> {
    let output = StatsOutput::from(session.store.statistics());
    ctx.emit(out, &output, |out| write_statistics(out, &output.stats))?;
    Ok(())
}
