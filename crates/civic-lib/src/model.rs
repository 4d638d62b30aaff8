//! Core data types for civic-lib.
//!
//! Field names serialize in camelCase so JSON output matches the shape the
//! browsing UI consumes (`createdAt`, `reportedBy`, ...).

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CivicError;

/// Issue triage status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema, Default,
)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Resolved,
}

impl Status {
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Resolved];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "inProgress",
            Self::Resolved => "resolved",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
        }
    }

    /// Position in the pending → inProgress → resolved pipeline.
    #[must_use]
    pub const fn stage(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::InProgress => 1,
            Self::Resolved => 2,
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::Resolved)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = CivicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pending" | "open" => Ok(Self::Pending),
            "inprogress" => Ok(Self::InProgress),
            "resolved" | "closed" => Ok(Self::Resolved),
            _ => Err(CivicError::InvalidStatus {
                status: s.trim().to_string(),
            }),
        }
    }
}

/// Issue category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub enum IssueType {
    #[default]
    Pothole,
    Streetlight,
    Garbage,
    WaterLeak,
    Graffiti,
    Sidewalk,
    TrafficLight,
    Other,
}

impl IssueType {
    pub const ALL: [Self; 8] = [
        Self::Pothole,
        Self::Streetlight,
        Self::Garbage,
        Self::WaterLeak,
        Self::Graffiti,
        Self::Sidewalk,
        Self::TrafficLight,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pothole => "pothole",
            Self::Streetlight => "streetlight",
            Self::Garbage => "garbage",
            Self::WaterLeak => "waterLeak",
            Self::Graffiti => "graffiti",
            Self::Sidewalk => "sidewalk",
            Self::TrafficLight => "trafficLight",
            Self::Other => "other",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pothole => "Pothole",
            Self::Streetlight => "Street Light Issue",
            Self::Garbage => "Garbage Collection",
            Self::WaterLeak => "Water Leak",
            Self::Graffiti => "Graffiti",
            Self::Sidewalk => "Damaged Sidewalk",
            Self::TrafficLight => "Traffic Light Issue",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = CivicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pothole" => Ok(Self::Pothole),
            "streetlight" => Ok(Self::Streetlight),
            "garbage" => Ok(Self::Garbage),
            "waterleak" => Ok(Self::WaterLeak),
            "graffiti" => Ok(Self::Graffiti),
            "sidewalk" => Ok(Self::Sidewalk),
            "trafficlight" => Ok(Self::TrafficLight),
            "other" => Ok(Self::Other),
            _ => Err(CivicError::InvalidType {
                issue_type: s.trim().to_string(),
            }),
        }
    }
}

/// Lowercase and drop separators so `in_progress`, `in-progress` and
/// `inProgress` all parse the same.
fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// A geographic position, optionally with a human-readable address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Location {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            address: None,
        }
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// (0, 0) is what an unfilled report form carries before detection ran.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_undetected(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

/// The primary issue entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Unique ID (e.g., "civ-k3x9").
    pub id: String,

    pub title: String,

    pub description: String,

    #[serde(rename = "type")]
    pub issue_type: IssueType,

    #[serde(default)]
    pub status: Status,

    pub location: Location,

    /// Opaque media references (URLs or upload handles), in upload order.
    #[serde(default)]
    pub media: Vec<String>,

    #[serde(default)]
    pub upvotes: u64,

    pub created_at: DateTime<Utc>,

    /// Set on every accepted mutation of this issue.
    pub updated_at: DateTime<Utc>,

    /// Discussion thread, oldest first.
    #[serde(default)]
    pub comments: Vec<Comment>,

    pub reported_by: String,
}

impl Issue {
    #[must_use]
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// True if the issue was changed after it was reported.
    #[must_use]
    pub fn was_updated(&self) -> bool {
        self.updated_at > self.created_at
    }

    /// Strip the store-assigned fields back off.
    #[must_use]
    pub fn to_draft(&self) -> IssueDraft {
        IssueDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            issue_type: self.issue_type,
            status: self.status,
            location: self.location.clone(),
            media: self.media.clone(),
            reported_by: self.reported_by.clone(),
        }
    }
}

/// Everything a reporter supplies; the store fills in the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct IssueDraft {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    #[serde(default)]
    pub status: Status,
    pub location: Location,
    #[serde(default)]
    pub media: Vec<String>,
    pub reported_by: String,
}

/// A comment on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub issue_id: String,
    pub author: String,
    #[serde(default)]
    pub is_admin: bool,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Input for a new comment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentDraft {
    pub author: String,
    pub is_admin: bool,
    pub content: String,
}

impl CommentDraft {
    #[must_use]
    pub fn citizen(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            is_admin: false,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn official(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            is_admin: true,
            content: content.into(),
        }
    }
}

/// Kind of store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Created,
    StatusChanged,
    Upvoted,
    Commented,
}

impl EventType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::StatusChanged => "status_changed",
            Self::Upvoted => "upvoted",
            Self::Commented => "commented",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An accepted mutation, in the order the store applied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub issue_id: String,
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_spellings() {
        for input in ["inProgress", "in_progress", "in-progress", "IN PROGRESS"] {
            assert_eq!(input.parse::<Status>().unwrap(), Status::InProgress);
        }
        assert_eq!("Resolved".parse::<Status>().unwrap(), Status::Resolved);
        assert!(matches!(
            "done".parse::<Status>(),
            Err(CivicError::InvalidStatus { ref status }) if status == "done"
        ));
    }

    #[test]
    fn test_issue_type_parse_spellings() {
        assert_eq!("water_leak".parse::<IssueType>().unwrap(), IssueType::WaterLeak);
        assert_eq!("trafficLight".parse::<IssueType>().unwrap(), IssueType::TrafficLight);
        assert!("volcano".parse::<IssueType>().is_err());
    }

    #[test]
    fn test_as_str_roundtrips_through_parse() {
        for status in Status::ALL {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
        }
        for issue_type in IssueType::ALL {
            assert_eq!(issue_type.as_str().parse::<IssueType>().unwrap(), issue_type);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(IssueType::Streetlight.label(), "Street Light Issue");
        assert_eq!(IssueType::Sidewalk.label(), "Damaged Sidewalk");
        assert_eq!(Status::InProgress.label(), "In Progress");
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let draft = IssueDraft {
            title: "Leak".to_string(),
            description: "Water on the road".to_string(),
            issue_type: IssueType::WaterLeak,
            status: Status::InProgress,
            location: Location::new(40.7, -74.0),
            media: vec![],
            reported_by: "Emily".to_string(),
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["type"], "waterLeak");
        assert_eq!(json["status"], "inProgress");
        assert_eq!(json["reportedBy"], "Emily");
        assert!(json["location"].get("address").is_none());
    }

    #[test]
    fn test_undetected_location() {
        assert!(Location::default().is_undetected());
        assert!(!Location::new(0.0, 12.5).is_undetected());
        assert!(!Location::new(40.71, -74.0).is_undetected());
    }
}
