//! Error types for `civic-lib`.

use std::path::PathBuf;
use thiserror::Error;

/// Everything an issue store operation can fail with.
#[derive(Error, Debug)]
pub enum CivicError {
    #[error("no such issue: {id}")]
    IssueNotFound { id: String },

    /// An imported issue reuses an id the store already holds.
    #[error("issue id already in use: {id}")]
    IdCollision { id: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Several fields were rejected at once.
    #[error("invalid input: {}", list(errors))]
    ValidationErrors { errors: Vec<ValidationError> },

    #[error("unknown status '{status}' (expected pending, inProgress or resolved)")]
    InvalidStatus { status: String },

    #[error("unknown issue type '{issue_type}'")]
    InvalidType { issue_type: String },

    /// Only raised under [`TransitionPolicy::ForwardOnly`](crate::TransitionPolicy).
    #[error("cannot move {id} from {from} back to {to}")]
    InvalidTransition { id: String, from: String, to: String },

    #[error("upvote count of {id} is at its maximum")]
    UpvoteOverflow { id: String },

    /// The geolocator had no position to give.
    #[error("location unavailable: {reason}")]
    LocationUnavailable { reason: String },

    /// A writer panicked while holding the shared store.
    #[error("concurrent access failed: {0}")]
    Concurrency(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("missing file: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One rejected field of a draft.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn list(errors: &[ValidationError]) -> String {
    let parts: Vec<String> = errors.iter().map(ToString::to_string).collect();
    parts.join(", ")
}

impl CivicError {
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::IssueNotFound { id: id.into() }
    }

    /// A lone problem is reported as [`CivicError::Validation`].
    #[must_use]
    pub fn from_validation_errors(mut errors: Vec<ValidationError>) -> Self {
        if let [_] = errors.as_slice() {
            let only = errors.remove(0);
            return Self::validation(only.field, only.message);
        }
        Self::ValidationErrors { errors }
    }

    /// True for input problems the caller can fix by changing the request.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::ValidationErrors { .. }
                | Self::InvalidStatus { .. }
                | Self::InvalidType { .. }
                | Self::InvalidTransition { .. }
        )
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::IssueNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, CivicError>;
