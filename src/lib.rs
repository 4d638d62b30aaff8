//! `civic_issues` - Community issue reporting
//!
//! This crate provides the `civ` CLI on top of [`civic_lib`].
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap, plus the interactive session
//! - [`config`] - Layered YAML configuration
//! - [`format`] - Text rendering and JSON output shapes
//! - [`logging`] - tracing subscriber setup
//! - [`output`] - Text/JSON output context

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod format;
pub mod logging;
pub mod output;

/// Run the CLI application.
///
/// This is the main entry point called from `main()`.
///
/// # Errors
///
/// Returns an error if configuration, logging setup or the selected command
/// fails.
pub fn run() -> anyhow::Result<()> {
    cli::run()
}
