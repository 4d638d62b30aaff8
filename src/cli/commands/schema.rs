//! Schema command: JSON schema of the issue document.

use std::io::{self, Write};

use civic_lib::Issue;

/// Print the JSON schema of [`Issue`].
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn execute(out: &mut dyn Write) -> io::Result<()> {
    let schema = schemars::schema_for!(Issue);
    serde_json::to_writer_pretty(&mut *out, &schema)?;
    writeln!(out)
}
