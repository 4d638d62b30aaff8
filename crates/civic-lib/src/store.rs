//! In-memory issue store.
//!
//! The single source of truth for issues and their embedded comments.
//! Every accepted mutation bumps [`IssueStore::version`], appends an
//! [`Event`] and notifies subscribed observers, in that order.

use std::collections::HashMap;
use std::fmt;

use crate::error::{CivicError, Result};
use crate::model::{Comment, CommentDraft, Event, EventType, Issue, IssueDraft, Status};
use crate::query::{self, FilterSpec};
use crate::stats::Statistics;
use crate::util::{self, IdSeed, MonotonicClock};
use crate::validation::{self, CommentValidator, IssueValidator};

/// Callback invoked after every accepted mutation.
pub type Observer = Box<dyn Fn(&Event) + Send + Sync>;

/// Which status changes `update_status` accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any status may follow any other, including resolved → pending.
    #[default]
    Permissive,
    /// Only same-stage or later-stage moves along pending → inProgress → resolved.
    ForwardOnly,
}

impl TransitionPolicy {
    #[must_use]
    pub const fn allows(self, from: Status, to: Status) -> bool {
        match self {
            Self::Permissive => true,
            Self::ForwardOnly => to.stage() >= from.stage(),
        }
    }
}

/// In-memory civic issue store.
///
/// Issues are kept in report order; any other ordering comes from
/// [`query::project`].
pub struct IssueStore {
    issues: Vec<Issue>,
    index: HashMap<String, usize>,
    events: Vec<Event>,
    observers: Vec<Observer>,
    clock: MonotonicClock,
    policy: TransitionPolicy,
    prefix: String,
    next_event_id: i64,
    next_comment_id: i64,
    next_sequence: u64,
    version: u64,
}

impl fmt::Debug for IssueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssueStore")
            .field("issues", &self.issues.len())
            .field("events", &self.events.len())
            .field("observers", &self.observers.len())
            .field("policy", &self.policy)
            .field("prefix", &self.prefix)
            .field("version", &self.version)
            .finish()
    }
}

impl IssueStore {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            issues: Vec::new(),
            index: HashMap::new(),
            events: Vec::new(),
            observers: Vec::new(),
            clock: MonotonicClock::new(),
            policy: TransitionPolicy::default(),
            prefix: "civ".to_string(),
            next_event_id: 1,
            next_comment_id: 1,
            next_sequence: 1,
            version: 0,
        }
    }

    /// Create a store pre-populated with already-identified issues.
    ///
    /// # Errors
    ///
    /// Returns the first import failure (see [`IssueStore::import_issue`]).
    pub fn with_issues(issues: impl IntoIterator<Item = Issue>) -> Result<Self> {
        let mut store = Self::new();
        for issue in issues {
            store.import_issue(issue)?;
        }
        Ok(store)
    }

    /// Prefix for ids minted from now on; existing ids keep theirs.
    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_transition_policy(&mut self, policy: TransitionPolicy) {
        self.policy = policy;
    }

    #[must_use]
    pub const fn transition_policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Register an observer for accepted mutations.
    pub fn subscribe(&mut self, observer: impl Fn(&Event) + Send + Sync + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Number of accepted mutations so far. Imports do not count.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Report a new issue.
    ///
    /// The store assigns the id, zero upvotes, an empty thread and
    /// `created_at == updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `Validation`/`ValidationErrors` if the title or description
    /// is blank or the location is missing or out of range.
    pub fn create_issue(&mut self, draft: IssueDraft) -> Result<Issue> {
        validation::check(&draft, IssueValidator::validate)?;

        let now = self.clock.now();
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let seed = IdSeed {
            title: &draft.title,
            reported_by: &draft.reported_by,
            created_at: now,
            sequence,
        };
        let id = util::generate_id(&self.prefix, &seed, self.issues.len(), |candidate| {
            self.index.contains_key(candidate)
        });

        let issue = Issue {
            id: id.clone(),
            title: draft.title,
            description: draft.description,
            issue_type: draft.issue_type,
            status: draft.status,
            location: draft.location,
            media: draft.media,
            upvotes: 0,
            created_at: now,
            updated_at: now,
            comments: Vec::new(),
            reported_by: draft.reported_by,
        };

        self.index.insert(id.clone(), self.issues.len());
        self.issues.push(issue.clone());

        tracing::debug!(issue_id = %id, issue_type = %issue.issue_type, "issue reported");
        self.record_event(&id, EventType::Created, None, Some(issue.status.as_str()), now);

        Ok(issue)
    }

    /// Move an issue to `status`.
    ///
    /// # Errors
    ///
    /// `IssueNotFound` for an unknown id; `InvalidTransition` when the
    /// forward-only policy rejects the move.
    pub fn update_status(&mut self, id: &str, status: Status) -> Result<Issue> {
        let pos = self.position(id)?;
        let old = self.issues[pos].status;

        if !self.policy.allows(old, status) {
            return Err(CivicError::InvalidTransition {
                id: id.to_string(),
                from: old.to_string(),
                to: status.to_string(),
            });
        }

        let now = self.clock.now();
        let issue = &mut self.issues[pos];
        issue.status = status;
        issue.updated_at = now;
        let updated = issue.clone();

        tracing::debug!(issue_id = %id, from = %old, to = %status, "status changed");
        self.record_event(
            id,
            EventType::StatusChanged,
            Some(old.as_str()),
            Some(status.as_str()),
            now,
        );

        Ok(updated)
    }

    /// Add one upvote and return the new count.
    ///
    /// No per-user dedup happens here; see [`crate::guard::UpvoteGuard`].
    ///
    /// # Errors
    ///
    /// `IssueNotFound` for an unknown id; `UpvoteOverflow` when the counter
    /// cannot grow by one.
    pub fn upvote(&mut self, id: &str) -> Result<u64> {
        let pos = self.position(id)?;
        let old = self.issues[pos].upvotes;
        let Some(next) = old.checked_add(1) else {
            return Err(CivicError::UpvoteOverflow { id: id.to_string() });
        };

        let now = self.clock.now();
        let issue = &mut self.issues[pos];
        issue.upvotes = next;
        issue.updated_at = now;
        let upvotes = issue.upvotes;

        tracing::debug!(issue_id = %id, upvotes, "issue upvoted");
        self.record_event(
            id,
            EventType::Upvoted,
            Some(&old.to_string()),
            Some(&upvotes.to_string()),
            now,
        );

        Ok(upvotes)
    }

    /// Append a comment to an issue's thread.
    ///
    /// # Errors
    ///
    /// `IssueNotFound` for an unknown id; `Validation` for blank content.
    /// Nothing is appended on failure.
    pub fn add_comment(&mut self, issue_id: &str, draft: CommentDraft) -> Result<Comment> {
        let pos = self.position(issue_id)?;
        validation::check(&draft, CommentValidator::validate)?;

        let now = self.clock.now();
        let comment = Comment {
            id: self.next_comment_id,
            issue_id: issue_id.to_string(),
            author: draft.author,
            is_admin: draft.is_admin,
            content: draft.content,
            created_at: now,
        };
        self.next_comment_id += 1;

        let issue = &mut self.issues[pos];
        issue.comments.push(comment.clone());
        issue.updated_at = now;

        tracing::debug!(
            issue_id,
            comment_id = comment.id,
            official = comment.is_admin,
            "comment added"
        );
        self.record_event(
            issue_id,
            EventType::Commented,
            None,
            Some(&comment.id.to_string()),
            now,
        );

        Ok(comment)
    }

    /// Insert an issue that already carries its id, timestamps and thread.
    ///
    /// Used to seed the feed. Does not emit an event or bump the version.
    ///
    /// # Errors
    ///
    /// Returns `IdCollision` if the id is taken, or validation errors for
    /// malformed issues.
    pub fn import_issue(&mut self, issue: Issue) -> Result<()> {
        validation::check(&issue, IssueValidator::validate_existing)?;
        if self.index.contains_key(&issue.id) {
            return Err(CivicError::IdCollision { id: issue.id });
        }

        for comment in &issue.comments {
            if comment.id >= self.next_comment_id {
                self.next_comment_id = comment.id + 1;
            }
        }
        self.clock.observe(issue.updated_at);

        tracing::trace!(issue_id = %issue.id, "issue imported");
        self.index.insert(issue.id.clone(), self.issues.len());
        self.issues.push(issue);
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Look up an issue. Absence is not an error here.
    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<&Issue> {
        self.index.get(id).map(|&pos| &self.issues[pos])
    }

    /// Look up one issue.
    ///
    /// # Errors
    ///
    /// `IssueNotFound` for an unknown id.
    pub fn get_issue(&self, id: &str) -> Result<&Issue> {
        self.get_by_id(id).ok_or_else(|| CivicError::not_found(id))
    }

    /// All issues, in report order.
    #[must_use]
    pub fn list_all(&self) -> &[Issue] {
        &self.issues
    }

    /// Filtered, sorted feed view over the current issues.
    #[must_use]
    pub fn project(&self, spec: &FilterSpec) -> Vec<&Issue> {
        query::project(&self.issues, spec)
    }

    /// Issues reported by `name` (case-insensitive), in report order.
    #[must_use]
    pub fn reported_by(&self, name: &str) -> Vec<&Issue> {
        let name = name.trim().to_lowercase();
        self.issues
            .iter()
            .filter(|i| i.reported_by.trim().to_lowercase() == name)
            .collect()
    }

    /// Case-insensitive substring match over title, description and
    /// address, in report order.
    #[must_use]
    pub fn search_issues(&self, query: &str) -> Vec<&Issue> {
        let needle = query.to_lowercase();
        let hit = |text: &str| text.to_lowercase().contains(&needle);
        self.issues
            .iter()
            .filter(|issue| {
                hit(&issue.title)
                    || hit(&issue.description)
                    || issue.location.address.as_deref().is_some_and(hit)
            })
            .collect()
    }

    /// Dashboard counters over every issue.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        Statistics::collect(&self.issues)
    }

    /// Whether `id` names an issue in this store.
    #[must_use]
    pub fn id_exists(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of issues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Whether the store has no issues.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// History of one issue, oldest first.
    #[must_use]
    pub fn get_events(&self, issue_id: &str) -> Vec<&Event> {
        self.events.iter().filter(|e| e.issue_id == issue_id).collect()
    }

    /// The whole event log.
    #[must_use]
    pub fn get_all_events(&self) -> &[Event] {
        &self.events
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| CivicError::not_found(id))
    }

    fn record_event(
        &mut self,
        issue_id: &str,
        event_type: EventType,
        old_value: Option<&str>,
        new_value: Option<&str>,
        created_at: chrono::DateTime<chrono::Utc>,
    ) {
        let event = Event {
            id: self.next_event_id,
            issue_id: issue_id.to_string(),
            event_type,
            old_value: old_value.map(str::to_owned),
            new_value: new_value.map(str::to_owned),
            created_at,
        };
        self.next_event_id += 1;
        self.version += 1;

        for observer in &self.observers {
            observer(&event);
        }
        self.events.push(event);
    }
}

impl Default for IssueStore {
    fn default() -> Self {
        Self::new()
    }
}
