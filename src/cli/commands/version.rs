//! Version command implementation.

use std::io::{self, Write};

use serde::Serialize;

use crate::output::OutputContext;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
    library: &'a str,
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn execute(ctx: &OutputContext, out: &mut dyn Write) -> io::Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };
    let output = VersionOutput {
        version,
        build,
        library: civic_lib::VERSION,
    };

    ctx.emit(out, &output, |out| {
        writeln!(out, "civ version {version} ({build})")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_text() {
        let mut buf = Vec::new();
        execute(&OutputContext::new(false), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with(&format!("civ version {}", env!("CARGO_PKG_VERSION"))));
    }

    #[test]
    fn test_version_json() {
        let mut buf = Vec::new();
        execute(&OutputContext::new(true), &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(value["library"], civic_lib::VERSION);
    }
}
