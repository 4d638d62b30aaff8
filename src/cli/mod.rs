//! Command-line interface for `civic_issues`.
//!
//! Two grammars live here: the process arguments ([`Cli`]) and the
//! commands typed inside a session ([`SessionLine`]), both parsed with clap.

pub mod commands;
pub mod session;

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::config::{self, CliOverrides};
use crate::logging;
use crate::output::OutputContext;

pub use session::{LineSource, Prompt, ScriptLines, Session, SessionError};

/// `civic_issues` (civ) - Community issue reporting.
#[derive(Parser, Debug)]
#[command(name = "civ")]
#[command(
    author,
    version,
    about = "Report, upvote and track civic issues in your community",
    long_about = None,
    after_help = "With no command, starts an interactive session reading commands from stdin."
)]
pub struct Cli {
    /// Output format: text (default) or json
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Extra config file, applied over user and workspace config
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Display name for reports and comments
    #[arg(long = "as", global = true, value_name = "NAME")]
    pub as_user: Option<String>,

    /// Run the session as a city administrator
    #[arg(long, global = true)]
    pub admin: bool,

    /// Start with an empty feed instead of the sample issues
    #[arg(long, global = true)]
    pub empty: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config_path: self.config.clone(),
            user: self.as_user.clone(),
            admin: self.admin,
            empty: self.empty,
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive session (default)
    Shell,

    /// Show version information
    Version,

    /// Print the JSON schema of an issue
    Schema,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// One line typed inside a session.
#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct SessionLine {
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Commands available inside a session.
#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Report a new issue at your current location
    Report(ReportArgs),

    /// Show the feed; filters persist between calls
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one issue with its comments and history
    Show(ShowArgs),

    /// Upvote an issue (once per client)
    Upvote(IdArgs),

    /// Comment on an issue
    Comment(CommentArgs),

    /// Change an issue's status (admin only)
    Status(StatusArgs),

    /// Dashboard statistics
    Stats,

    /// Issues you reported
    Mine,

    /// Search titles, descriptions and addresses
    Search(SearchArgs),

    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Short summary
    #[arg(long)]
    pub title: String,

    /// What is wrong
    #[arg(long)]
    pub description: String,

    /// Issue type (pothole, streetlight, garbage, waterLeak, graffiti, sidewalk, trafficLight, other)
    #[arg(long = "type", default_value = "other")]
    pub type_: String,

    /// Photo or video reference (repeatable)
    #[arg(long)]
    pub media: Vec<String>,

    /// Latitude; skips location detection when given with --lon
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Address for a manually entered position
    #[arg(long)]
    pub address: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Filter by status (pending, inProgress, resolved, or all)
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by type (or all)
    #[arg(long = "type")]
    pub type_: Option<String>,

    /// Sort: newest, oldest, upvotes, comments
    #[arg(long)]
    pub sort: Option<String>,

    /// Reset filters to the default feed before applying the others
    #[arg(long)]
    pub reset: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Issue ID
    pub id: String,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    /// Issue ID
    pub id: String,
}

#[derive(Args, Debug)]
pub struct CommentArgs {
    /// Issue ID
    pub id: String,

    /// Comment text
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Post as an official response (admin sessions only)
    #[arg(long)]
    pub official: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Issue ID
    pub id: String,

    /// New status (pending, inProgress, resolved)
    pub status: String,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Text to look for
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,
}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let ctx = OutputContext::new(cli.json);

    match &cli.command {
        Some(Commands::Version) => {
            logging::init_logging(cli.verbose, cli.quiet, None)?;
            commands::version::execute(&ctx, &mut io::stdout().lock())?;
        }
        Some(Commands::Schema) => {
            logging::init_logging(cli.verbose, cli.quiet, None)?;
            commands::schema::execute(&mut io::stdout().lock())?;
        }
        Some(Commands::Completions(args)) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "civ", &mut io::stdout());
        }
        Some(Commands::Shell) | None => run_session(&cli, ctx)?,
    }

    Ok(())
}

fn run_session(cli: &Cli, ctx: OutputContext) -> Result<()> {
    let root = std::env::current_dir().context("cannot determine working directory")?;
    let config = config::load_config(&root, &cli.overrides())?;
    logging::init_logging(cli.verbose, cli.quiet, config.log_file.as_deref())?;

    let mut session = Session::open(config)?;
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut source: Box<dyn LineSource> = if interactive {
        Box::new(Prompt::new()?)
    } else {
        Box::new(ScriptLines::new(stdin.lock()))
    };
    let failures = session.run(
        source.as_mut(),
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
        ctx,
    )?;

    if failures > 0 && !interactive {
        anyhow::bail!("{failures} session command(s) failed");
    }
    Ok(())
}
