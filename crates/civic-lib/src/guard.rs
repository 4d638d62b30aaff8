//! Per-client upvote ledger.
//!
//! The store counts every upvote it is given; this module is the policy
//! layer that keeps one client from upvoting the same issue twice. The
//! ledger is a typed set of issue ids behind an explicit load/save
//! boundary ([`LedgerBackend`]), so it can live in a file, in memory, or
//! anywhere else a backend is written for.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CivicError, Result};
use crate::store::IssueStore;

/// Issue ids this client has already upvoted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpvoteLedger {
    #[serde(default)]
    upvoted: BTreeSet<String>,
}

impl UpvoteLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has_upvoted(&self, issue_id: &str) -> bool {
        self.upvoted.contains(issue_id)
    }

    /// Record an upvote. Returns false if it was already recorded.
    pub fn mark_upvoted(&mut self, issue_id: &str) -> bool {
        self.upvoted.insert(issue_id.to_string())
    }

    /// Keep only the ids `keep` accepts. Returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let before = self.upvoted.len();
        self.upvoted.retain(|id| keep(id));
        before - self.upvoted.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.upvoted.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upvoted.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.upvoted.iter().map(String::as_str)
    }
}

/// Durable home for a client's ledger.
pub trait LedgerBackend {
    /// Load the ledger; a backend with nothing stored yet returns an empty one.
    ///
    /// # Errors
    ///
    /// Returns an error if stored data exists but cannot be read.
    fn load(&self) -> Result<UpvoteLedger>;

    /// Persist the ledger, replacing what was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be written.
    fn save(&mut self, ledger: &UpvoteLedger) -> Result<()>;
}

impl<B: LedgerBackend + ?Sized> LedgerBackend for Box<B> {
    fn load(&self) -> Result<UpvoteLedger> {
        (**self).load()
    }

    fn save(&mut self, ledger: &UpvoteLedger) -> Result<()> {
        (**self).save(ledger)
    }
}

/// Ledger kept only for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    stored: UpvoteLedger,
    saves: usize,
}

impl MemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `save` ran.
    #[must_use]
    pub const fn save_count(&self) -> usize {
        self.saves
    }
}

impl LedgerBackend for MemoryLedger {
    fn load(&self) -> Result<UpvoteLedger> {
        Ok(self.stored.clone())
    }

    fn save(&mut self, ledger: &UpvoteLedger) -> Result<()> {
        self.stored = ledger.clone();
        self.saves += 1;
        Ok(())
    }
}

/// Ledger stored as one JSON file per client identity.
#[derive(Debug, Clone)]
pub struct JsonFileLedger {
    path: PathBuf,
}

impl JsonFileLedger {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/upvotes-<client_id>.json`, with the client id reduced to
    /// filename-safe characters.
    #[must_use]
    pub fn for_client(dir: &Path, client_id: &str) -> Self {
        let safe: String = client_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let safe = if safe.is_empty() { "default".to_string() } else { safe };
        Self::new(dir.join(format!("upvotes-{safe}.json")))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerBackend for JsonFileLedger {
    fn load(&self) -> Result<UpvoteLedger> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(UpvoteLedger::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(UpvoteLedger::new()),
            Err(e) => Err(CivicError::Io(e)),
        }
    }

    /// Write-to-temp + rename so a crash never leaves a half-written ledger.
    fn save(&mut self, ledger: &UpvoteLedger) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp_path)?;
        let json = serde_json::to_string_pretty(ledger)?;
        writeln!(file, "{json}")?;
        file.flush()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// Outcome of a guarded upvote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpvoteOutcome {
    /// The store accepted the upvote; `upvotes` is the new count.
    Accepted { upvotes: u64 },
    /// This client had already upvoted the issue; nothing changed.
    AlreadyUpvoted,
}

/// Ledger plus backend: check, upvote, record.
#[derive(Debug)]
pub struct UpvoteGuard<B: LedgerBackend> {
    ledger: UpvoteLedger,
    backend: B,
}

impl<B: LedgerBackend> UpvoteGuard<B> {
    /// Load the ledger from `backend`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend holds unreadable data.
    pub fn load(backend: B) -> Result<Self> {
        let ledger = backend.load()?;
        tracing::debug!(entries = ledger.len(), "upvote ledger loaded");
        Ok(Self { ledger, backend })
    }

    #[must_use]
    pub fn has_upvoted(&self, issue_id: &str) -> bool {
        self.ledger.has_upvoted(issue_id)
    }

    /// Record an upvote and persist the ledger. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot save.
    pub fn mark_upvoted(&mut self, issue_id: &str) -> Result<()> {
        if self.ledger.mark_upvoted(issue_id) {
            self.backend.save(&self.ledger)?;
        }
        Ok(())
    }

    /// Forget upvotes for issues `store` does not hold, saving only when
    /// something was dropped. Returns the number of dropped entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot save.
    pub fn prune(&mut self, store: &IssueStore) -> Result<usize> {
        let dropped = self.ledger.retain(|id| store.id_exists(id));
        if dropped > 0 {
            tracing::debug!(dropped, "stale upvote ledger entries pruned");
            self.backend.save(&self.ledger)?;
        }
        Ok(dropped)
    }

    /// Upvote `issue_id` unless this client already did.
    ///
    /// The store mutation happens first; the ledger is marked only once it
    /// succeeds. A failed save after an accepted upvote is reported but not
    /// rolled back, and the in-memory ledger still blocks a repeat.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` from the store, or a backend save error.
    pub fn upvote_once(&mut self, store: &mut IssueStore, issue_id: &str) -> Result<UpvoteOutcome> {
        if self.has_upvoted(issue_id) {
            tracing::debug!(issue_id, "upvote skipped: already upvoted");
            return Ok(UpvoteOutcome::AlreadyUpvoted);
        }

        let upvotes = store.upvote(issue_id)?;
        if let Err(err) = self.mark_upvoted(issue_id) {
            tracing::warn!(issue_id, error = %err, "upvote accepted but ledger save failed");
            return Err(err);
        }
        Ok(UpvoteOutcome::Accepted { upvotes })
    }

    #[must_use]
    pub const fn ledger(&self) -> &UpvoteLedger {
        &self.ledger
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }
}
