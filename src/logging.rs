//! Logging setup.
//!
//! `RUST_LOG` wins when set; otherwise verbosity flags pick the level.
//! Logs go to stderr, or to `log_file` when one is configured, so stdout
//! stays clean for command output.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Default filter directive for the given flags.
#[must_use]
pub const fn level_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

fn build_filter(verbose: u8, quiet: bool) -> Result<EnvFilter> {
    match std::env::var("RUST_LOG") {
        Ok(directive) if !directive.trim().is_empty() => {
            EnvFilter::try_new(&directive).with_context(|| format!("invalid RUST_LOG: {directive}"))
        }
        _ => EnvFilter::try_new(level_directive(verbose, quiet))
            .context("invalid default log filter"),
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the filter is invalid, the log file cannot be
/// opened, or a subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = build_filter(verbose, quiet)?;

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .try_init()
            .context("failed to install log subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .context("failed to install log subscriber")?;
    }

    Ok(())
}
