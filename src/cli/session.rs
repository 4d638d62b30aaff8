//! Interactive session.
//!
//! A session owns one in-memory [`IssueStore`] for its lifetime, plus the
//! client's upvote guard, the geolocation collaborator and the feed filter.
//! It reads one command per line from a [`LineSource`]: a line editor with
//! history at a terminal, plain buffered lines for a piped script.

use std::fmt;
use std::io::{self, BufRead, Write};

use clap::Parser;
use clap::error::ErrorKind;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use civic_lib::{
    CachedProjection, CivicError, FilterSpec, Geolocator, IssueStore, JsonFileLedger,
    LedgerBackend, UpvoteGuard,
};
use thiserror::Error;

use super::commands;
use super::{SessionCommand, SessionLine};
use crate::config::CivicConfig;
use crate::output::OutputContext;

/// Errors from a single session command.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Civic(#[from] CivicError),

    /// Malformed command line.
    #[error("{0}")]
    Usage(String),

    #[error("{action} require an admin session (start with --admin)")]
    Forbidden { action: &'static str },

    #[error("output failed: {0}")]
    Io(#[from] io::Error),

    #[error("line editor failed: {0}")]
    Editor(#[from] ReadlineError),
}

/// Where session lines come from. `None` ends the session.
pub trait LineSource {
    /// # Errors
    ///
    /// Returns an error when the underlying input cannot be read.
    fn next_line(&mut self) -> Result<Option<String>, SessionError>;
}

/// Lines of a piped script or any other buffered reader.
#[derive(Debug)]
pub struct ScriptLines<R> {
    lines: io::Lines<R>,
}

impl<R: BufRead> ScriptLines<R> {
    #[must_use]
    pub fn new(input: R) -> Self {
        Self {
            lines: input.lines(),
        }
    }
}

impl<R: BufRead> LineSource for ScriptLines<R> {
    fn next_line(&mut self) -> Result<Option<String>, SessionError> {
        Ok(self.lines.next().transpose()?)
    }
}

/// Terminal prompt with line editing and in-memory history.
pub struct Prompt {
    editor: DefaultEditor,
}

impl Prompt {
    pub const TEXT: &'static str = "civ> ";

    /// # Errors
    ///
    /// Returns `Editor` if the terminal cannot be set up.
    pub fn new() -> Result<Self, SessionError> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for Prompt {
    fn next_line(&mut self) -> Result<Option<String>, SessionError> {
        match self.editor.readline(Self::TEXT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        tracing::debug!(error = %e, "history entry dropped");
                    }
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Whether the loop keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    pub(crate) store: IssueStore,
    pub(crate) guard: UpvoteGuard<Box<dyn LedgerBackend>>,
    pub(crate) geolocator: Box<dyn Geolocator>,
    pub(crate) config: CivicConfig,
    pub(crate) filter: FilterSpec,
    pub(crate) feed: CachedProjection,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store)
            .field("upvoted", &self.guard.ledger().len())
            .field("config", &self.config)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Open a session with the ledger file and geolocator named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger file exists but cannot be read, or the
    /// sample feed fails to load.
    pub fn open(config: CivicConfig) -> Result<Self, SessionError> {
        let backend = JsonFileLedger::for_client(&config.data_dir, &config.client_id);
        tracing::debug!(path = %backend.path().display(), "using upvote ledger");
        let geolocator = config.geolocator();
        Self::with_parts(config, Box::new(backend), Box::new(geolocator))
    }

    /// Open a session with explicit collaborators.
    ///
    /// # Errors
    ///
    /// See [`Session::open`].
    pub fn with_parts(
        config: CivicConfig,
        backend: Box<dyn LedgerBackend>,
        geolocator: Box<dyn Geolocator>,
    ) -> Result<Self, SessionError> {
        let mut store = IssueStore::new();
        store.set_prefix(config.id_prefix.clone());
        store.set_transition_policy(config.transition_policy());
        if config.seed_sample_data {
            for issue in civic_lib::seed::sample_issues() {
                store.import_issue(issue)?;
            }
        }
        store.subscribe(|event| {
            tracing::info!(
                issue_id = %event.issue_id,
                event = %event.event_type,
                old = event.old_value.as_deref().unwrap_or(""),
                new = event.new_value.as_deref().unwrap_or(""),
                "issue event"
            );
        });

        let mut guard = UpvoteGuard::load(backend)?;
        if config.seed_sample_data {
            // Only the sample ids outlive a session; an empty feed would drop them too.
            guard.prune(&store)?;
        }
        let filter = FilterSpec::feed_default().sorted_by(config.default_sort);
        tracing::debug!(
            issues = store.len(),
            user = %config.user,
            admin = config.admin,
            "session opened"
        );

        Ok(Self {
            store,
            guard,
            geolocator,
            config,
            filter,
            feed: CachedProjection::new(),
        })
    }

    #[must_use]
    pub const fn store(&self) -> &IssueStore {
        &self.store
    }

    #[must_use]
    pub const fn config(&self) -> &CivicConfig {
        &self.config
    }

    /// The feed filter `list` currently applies.
    #[must_use]
    pub const fn filter(&self) -> FilterSpec {
        self.filter
    }

    /// The filter a fresh session starts with.
    #[must_use]
    pub const fn default_filter(&self) -> FilterSpec {
        FilterSpec::feed_default().sorted_by(self.config.default_sort)
    }

    pub(crate) fn require_admin(&self, action: &'static str) -> Result<(), SessionError> {
        if self.config.admin {
            Ok(())
        } else {
            Err(SessionError::Forbidden { action })
        }
    }

    /// Read and execute commands until end of input or `quit`.
    ///
    /// A failing command prints `Error: ...` to `err` and the loop goes on.
    /// Returns how many commands failed.
    ///
    /// # Errors
    ///
    /// Returns an error only when reading input or writing output fails.
    pub fn run(
        &mut self,
        source: &mut dyn LineSource,
        out: &mut dyn Write,
        err: &mut dyn Write,
        ctx: OutputContext,
    ) -> Result<usize, SessionError> {
        let mut failures = 0;
        while let Some(line) = source.next_line()? {
            match self.execute_line(&line, out, &ctx) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e @ (SessionError::Io(_) | SessionError::Editor(_))) => return Err(e),
                Err(e) => {
                    failures += 1;
                    tracing::debug!(line = %line, error = %e, "session command failed");
                    writeln!(err, "Error: {e}")?;
                }
            }
        }
        out.flush()?;
        Ok(failures)
    }

    /// Parse and run one command line.
    ///
    /// Blank lines and `#` comments are ignored.
    ///
    /// # Errors
    ///
    /// Returns the command's error. A rejected command leaves the store and
    /// the feed filter as they were.
    pub fn execute_line(
        &mut self,
        line: &str,
        out: &mut dyn Write,
        ctx: &OutputContext,
    ) -> Result<Flow, SessionError> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(Flow::Continue);
        }

        let tokens = tokenize(trimmed)?;
        match SessionLine::try_parse_from(tokens) {
            Ok(parsed) => self.dispatch(parsed.command, out, ctx),
            Err(e) => match e.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                    write!(out, "{e}")?;
                    Ok(Flow::Continue)
                }
                _ => {
                    let message = e.to_string();
                    let message = message.trim_end();
                    let message = message.strip_prefix("error: ").unwrap_or(message);
                    Err(SessionError::Usage(message.to_string()))
                }
            },
        }
    }

    /// Run one parsed command.
    ///
    /// # Errors
    ///
    /// Returns the command's error.
    pub fn dispatch(
        &mut self,
        command: SessionCommand,
        out: &mut dyn Write,
        ctx: &OutputContext,
    ) -> Result<Flow, SessionError> {
        match command {
            SessionCommand::Report(args) => commands::report::execute(&args, self, out, ctx)?,
            SessionCommand::List(args) => commands::list::execute(&args, self, out, ctx)?,
            SessionCommand::Show(args) => commands::show::execute(&args.id, self, out, ctx)?,
            SessionCommand::Upvote(args) => commands::upvote::execute(&args.id, self, out, ctx)?,
            SessionCommand::Comment(args) => commands::comment::execute(&args, self, out, ctx)?,
            SessionCommand::Status(args) => commands::status::execute(&args, self, out, ctx)?,
            SessionCommand::Stats => commands::stats::execute(self, out, ctx)?,
            SessionCommand::Mine => commands::mine::execute(self, out, ctx)?,
            SessionCommand::Search(args) => commands::search::execute(&args, self, out, ctx)?,
            SessionCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

/// Split a command line into words.
///
/// Whitespace separates words. Single quotes keep their contents literally;
/// double quotes allow `\"` and `\\`; outside quotes a backslash escapes the
/// next character. Quoted pieces next to each other join into one word.
///
/// # Errors
///
/// Returns `Usage` for an unterminated quote or a trailing backslash.
pub fn tokenize(line: &str) -> Result<Vec<String>, SessionError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match ch {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(SessionError::Usage("unterminated ' quote".into())),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\')) => current.push(c),
                            Some(c) => {
                                current.push('\\');
                                current.push(c);
                            }
                            None => {
                                return Err(SessionError::Usage("unterminated \" quote".into()));
                            }
                        },
                        Some(c) => current.push(c),
                        None => return Err(SessionError::Usage("unterminated \" quote".into())),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(c) => current.push(c),
                    None => return Err(SessionError::Usage("trailing backslash".into())),
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_lib::{Coordinates, FixedGeolocator, MemoryLedger, Status};

    fn session(admin: bool) -> Session {
        let config = CivicConfig {
            admin,
            user: "Tester".to_string(),
            ..Default::default()
        };
        let geo = FixedGeolocator::new(Coordinates::new(40.7128, -74.006));
        Session::with_parts(config, Box::new(MemoryLedger::new()), Box::new(geo)).unwrap()
    }

    fn run_script(session: &mut Session, script: &str, json: bool) -> (String, String, usize) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let failures = session
            .run(
                &mut ScriptLines::new(script.as_bytes()),
                &mut out,
                &mut err,
                OutputContext::new(json),
            )
            .unwrap();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
            failures,
        )
    }

    #[test]
    fn test_tokenize_plain_words() {
        assert_eq!(tokenize("list --sort upvotes").unwrap(), ["list", "--sort", "upvotes"]);
        assert_eq!(tokenize("  show   civ-1  ").unwrap(), ["show", "civ-1"]);
        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(
            tokenize(r#"report --title "Big hole" --description 'It''s deep'"#).unwrap(),
            ["report", "--title", "Big hole", "--description", "Its deep"]
        );
        assert_eq!(tokenize(r#"comment civ-1 "say \"hi\"""#).unwrap(), [
            "comment",
            "civ-1",
            "say \"hi\""
        ]);
        assert_eq!(tokenize(r"a\ b").unwrap(), ["a b"]);
        assert_eq!(tokenize(r#"x "" y"#).unwrap(), ["x", "", "y"]);
    }

    #[test]
    fn test_tokenize_unterminated() {
        assert!(matches!(tokenize("say \"oops"), Err(SessionError::Usage(_))));
        assert!(matches!(tokenize("say 'oops"), Err(SessionError::Usage(_))));
        assert!(matches!(tokenize("trailing \\"), Err(SessionError::Usage(_))));
    }

    proptest::proptest! {
        #[test]
        fn prop_plain_words_split_on_whitespace(
            words in proptest::collection::vec("[a-zA-Z0-9.,:-]{1,12}", 0..8),
        ) {
            let line = words.join("  ");
            proptest::prop_assert_eq!(tokenize(&line).unwrap(), words);
        }

        #[test]
        fn prop_single_quotes_keep_text_verbatim(text in "[^']{0,40}") {
            let tokens = tokenize(&format!("comment civ-1 '{text}'")).unwrap();
            proptest::prop_assert_eq!(tokens, vec!["comment".to_string(), "civ-1".to_string(), text]);
        }
    }

    #[test]
    fn test_seeded_session() {
        let s = session(false);
        assert_eq!(s.store().len(), 4);
        assert_eq!(s.filter(), FilterSpec::feed_default());
    }

    #[test]
    fn test_empty_session() {
        let config = CivicConfig {
            seed_sample_data: false,
            ..Default::default()
        };
        let s = Session::with_parts(
            config,
            Box::new(MemoryLedger::new()),
            Box::new(FixedGeolocator::unavailable()),
        )
        .unwrap();
        assert!(s.store().is_empty());
    }

    #[test]
    fn test_script_runs_and_counts_failures() {
        let mut s = session(false);
        let (out, err, failures) = run_script(
            &mut s,
            "# comment line\n\nlist --sort upvotes\nshow civ-missing\nbogus\n",
            false,
        );
        assert_eq!(failures, 2);
        assert!(out.starts_with("○ civ-4 [waterLeak] Water Main Leak"));
        assert!(err.contains("Error: no such issue: civ-missing"));
        assert!(err.contains("unrecognized subcommand"));
    }

    struct Typed(std::collections::VecDeque<Result<String, io::ErrorKind>>);

    impl LineSource for Typed {
        fn next_line(&mut self) -> Result<Option<String>, SessionError> {
            match self.0.pop_front() {
                Some(Ok(line)) => Ok(Some(line)),
                Some(Err(kind)) => Err(io::Error::from(kind).into()),
                None => Ok(None),
            }
        }
    }

    #[test]
    fn test_run_reads_any_line_source() {
        let mut s = session(false);
        let mut source = Typed(
            ["upvote civ-1", "upvote civ-1"]
                .into_iter()
                .map(|l| Ok(l.to_string()))
                .collect(),
        );
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let failures = s
            .run(&mut source, &mut out, &mut err, OutputContext::new(false))
            .unwrap();
        assert_eq!(failures, 0);
        assert_eq!(s.store().get_issue("civ-1").unwrap().upvotes, 16);
        assert!(String::from_utf8(out).unwrap().contains("already upvoted"));
    }

    #[test]
    fn test_run_stops_on_input_error() {
        let mut s = session(false);
        let mut source = Typed(
            [Ok("list".to_string()), Err(io::ErrorKind::BrokenPipe), Ok("stats".to_string())]
                .into_iter()
                .collect(),
        );
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let result = s.run(&mut source, &mut out, &mut err, OutputContext::new(false));
        assert!(matches!(result, Err(SessionError::Io(_))));
        assert_eq!(source.0.len(), 1);
    }

    #[test]
    fn test_quit_stops_reading() {
        let mut s = session(false);
        let (out, _, failures) = run_script(&mut s, "quit\nlist\n", false);
        assert_eq!(failures, 0);
        assert!(out.is_empty());

        let (_, _, failures) = run_script(&mut s, "exit\nbogus\n", false);
        assert_eq!(failures, 0);
    }

    #[test]
    fn test_help_goes_to_stdout() {
        let mut s = session(false);
        let (out, err, failures) = run_script(&mut s, "help\n", false);
        assert_eq!(failures, 0);
        assert!(err.is_empty());
        assert!(out.contains("report"));
        assert!(out.contains("upvote"));
    }

    #[test]
    fn test_status_requires_admin() {
        let mut s = session(false);
        let (_, err, failures) = run_script(&mut s, "status civ-1 resolved\n", false);
        assert_eq!(failures, 1);
        assert!(err.contains("require an admin session"));
        assert_eq!(s.store().get_issue("civ-1").unwrap().status, Status::Pending);

        let mut admin = session(true);
        let (out, _, failures) = run_script(&mut admin, "status civ-1 resolved\n", false);
        assert_eq!(failures, 0);
        assert!(out.contains("civ-1"));
        assert_eq!(admin.store().get_issue("civ-1").unwrap().status, Status::Resolved);
    }

    #[test]
    fn test_full_flow_json() {
        let mut s = session(false);
        let script = "report --title Pothole --description 'Deep hole' --type pothole\n\
                      upvote civ-4\n\
                      upvote civ-4\n\
                      stats\n";
        let (out, err, failures) = run_script(&mut s, script, true);
        assert_eq!(failures, 0, "stderr: {err}");

        let docs: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(docs.len(), 4);
        assert_eq!(docs[0]["title"], "Pothole");
        assert_eq!(docs[0]["reportedBy"], "Tester");
        assert_eq!(docs[0]["location"]["address"], "40.7128°N, 74.0060°W");
        assert_eq!(docs[1]["outcome"], "accepted");
        assert_eq!(docs[1]["upvotes"], 21);
        assert_eq!(docs[2]["outcome"], "already_upvoted");
        assert_eq!(docs[3]["total"], 5);
        assert_eq!(docs[3]["totalUpvotes"], 56);
    }
}
