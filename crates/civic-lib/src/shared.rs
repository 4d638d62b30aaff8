//! Thread-safe handle over an [`IssueStore`].
//!
//! Each mutation holds the write lock for its whole read-modify-write, so
//! concurrent upvotes are never lost. Reads take the read lock and return
//! owned snapshots, so a caller never observes a half-applied change.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{CivicError, Result};
use crate::model::{Comment, CommentDraft, Issue, IssueDraft, Status};
use crate::query::{self, FilterSpec};
use crate::store::IssueStore;

/// Cloneable, lock-protected store handle.
#[derive(Debug, Clone, Default)]
pub struct SharedIssueStore {
    inner: Arc<RwLock<IssueStore>>,
}

impl SharedIssueStore {
    #[must_use]
    pub fn new(store: IssueStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, IssueStore>> {
        self.inner
            .read()
            .map_err(|_| CivicError::Concurrency("issue store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, IssueStore>> {
        self.inner
            .write()
            .map_err(|_| CivicError::Concurrency("issue store lock poisoned".to_string()))
    }

    /// # Errors
    ///
    /// See [`IssueStore::create_issue`]; `Concurrency` if the lock is poisoned.
    pub fn create_issue(&self, draft: IssueDraft) -> Result<Issue> {
        self.write()?.create_issue(draft)
    }

    /// # Errors
    ///
    /// See [`IssueStore::update_status`]; `Concurrency` if the lock is poisoned.
    pub fn update_status(&self, id: &str, status: Status) -> Result<Issue> {
        self.write()?.update_status(id, status)
    }

    /// # Errors
    ///
    /// See [`IssueStore::upvote`]; `Concurrency` if the lock is poisoned.
    pub fn upvote(&self, id: &str) -> Result<u64> {
        self.write()?.upvote(id)
    }

    /// # Errors
    ///
    /// See [`IssueStore::add_comment`]; `Concurrency` if the lock is poisoned.
    pub fn add_comment(&self, issue_id: &str, draft: CommentDraft) -> Result<Comment> {
        self.write()?.add_comment(issue_id, draft)
    }

    /// # Errors
    ///
    /// `Concurrency` if the lock is poisoned.
    pub fn get_by_id(&self, id: &str) -> Result<Option<Issue>> {
        Ok(self.read()?.get_by_id(id).cloned())
    }

    /// Snapshot of every issue.
    ///
    /// # Errors
    ///
    /// `Concurrency` if the lock is poisoned.
    pub fn list_all(&self) -> Result<Vec<Issue>> {
        Ok(self.read()?.list_all().to_vec())
    }

    /// Snapshot projection, computed under one read lock.
    ///
    /// # Errors
    ///
    /// `Concurrency` if the lock is poisoned.
    pub fn project(&self, spec: &FilterSpec) -> Result<Vec<Issue>> {
        Ok(query::project_owned(self.read()?.list_all(), spec))
    }

    /// # Errors
    ///
    /// `Concurrency` if the lock is poisoned.
    pub fn version(&self) -> Result<u64> {
        Ok(self.read()?.version())
    }

    /// Run `f` with exclusive access, for multi-step updates that must not
    /// interleave with other writers.
    ///
    /// # Errors
    ///
    /// `Concurrency` if the lock is poisoned, otherwise whatever `f` returns.
    pub fn with_store<T>(&self, f: impl FnOnce(&mut IssueStore) -> Result<T>) -> Result<T> {
        let mut store = self.write()?;
        f(&mut store)
    }
}
