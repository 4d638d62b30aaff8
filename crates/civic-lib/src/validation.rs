//! Validation helpers.
//!
//! These routines enforce the issue and comment constraints and return
//! structured validation errors without touching the store.

use crate::error::{CivicError, ValidationError};
use crate::model::{CommentDraft, Issue, IssueDraft, Location};

/// Validates report drafts.
pub struct IssueValidator;

impl IssueValidator {
    /// Validate a draft and return all validation errors found.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate(draft: &IssueDraft) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if draft.title.trim().is_empty() {
            errors.push(ValidationError::new("title", "cannot be empty"));
        }

        if draft.description.trim().is_empty() {
            errors.push(ValidationError::new("description", "cannot be empty"));
        }

        if let Err(err) = LocationValidator::validate(&draft.location) {
            errors.push(err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate an already-identified issue before import.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate_existing(issue: &Issue) -> Result<(), Vec<ValidationError>> {
        let mut errors = match Self::validate(&issue.to_draft()) {
            Ok(()) => Vec::new(),
            Err(errors) => errors,
        };

        if issue.id.trim().is_empty() {
            errors.push(ValidationError::new("id", "cannot be empty"));
        }
        if issue.updated_at < issue.created_at {
            errors.push(ValidationError::new(
                "updatedAt",
                "cannot be before createdAt",
            ));
        }
        for comment in &issue.comments {
            if comment.issue_id != issue.id {
                errors.push(ValidationError::new(
                    "comments",
                    format!("comment {} belongs to {}", comment.id, comment.issue_id),
                ));
            }
            if comment.content.trim().is_empty() {
                errors.push(ValidationError::new(
                    "comments",
                    format!("comment {} has empty content", comment.id),
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Validates reported positions.
pub struct LocationValidator;

impl LocationValidator {
    /// Reject positions that are not real coordinates, including the (0, 0)
    /// placeholder a report carries before detection ran.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` naming the `location` field.
    pub fn validate(location: &Location) -> Result<(), ValidationError> {
        if !location.latitude.is_finite() || !location.longitude.is_finite() {
            return Err(ValidationError::new("location", "coordinates must be finite"));
        }
        if !(-90.0..=90.0).contains(&location.latitude) {
            return Err(ValidationError::new(
                "location",
                "latitude must be between -90 and 90",
            ));
        }
        if !(-180.0..=180.0).contains(&location.longitude) {
            return Err(ValidationError::new(
                "location",
                "longitude must be between -180 and 180",
            ));
        }
        if location.is_undetected() {
            return Err(ValidationError::new("location", "location has not been detected"));
        }
        Ok(())
    }
}

/// Validates comment fields.
pub struct CommentValidator;

impl CommentValidator {
    /// Only the content is checked; any author and any length are accepted.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate(comment: &CommentDraft) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if comment.content.trim().is_empty() {
            errors.push(ValidationError::new("content", "cannot be empty"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Run a validator and fold its errors into a single `CivicError`.
pub(crate) fn check<T>(
    value: &T,
    validate: impl FnOnce(&T) -> Result<(), Vec<ValidationError>>,
) -> Result<(), CivicError> {
    validate(value).map_err(CivicError::from_validation_errors)
}
