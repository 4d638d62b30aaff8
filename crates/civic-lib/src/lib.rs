//! `civic-lib` - In-process civic issue tracking library.
//!
//! Holds the community issue feed in memory: citizens report
//! location-tagged issues, upvote and comment on them, and administrators
//! move them through pending → inProgress → resolved.
//!
//! # Quick Start
//!
//! ```
//! use civic_lib::{FilterSpec, IssueDraft, IssueStore, IssueType, Location, SortBy, Status};
//!
//! let mut store = IssueStore::new();
//!
//! // Report
//! let issue = store.create_issue(IssueDraft {
//!     title: "Pothole".into(),
//!     description: "Deep hole".into(),
//!     issue_type: IssueType::Pothole,
//!     location: Location::new(40.71, -74.00),
//!     reported_by: "Jane".into(),
//!     ..Default::default()
//! }).unwrap();
//!
//! // Engage
//! store.upvote(&issue.id).unwrap();
//! store.update_status(&issue.id, Status::InProgress).unwrap();
//!
//! // Browse
//! let feed = store.project(&FilterSpec::default().sorted_by(SortBy::Upvotes));
//! assert_eq!(feed[0].upvotes, 1);
//! ```

pub mod error;
pub mod geo;
pub mod guard;
pub mod model;
pub mod query;
pub mod seed;
pub mod shared;
pub mod stats;
pub mod store;
pub mod util;
pub mod validation;

pub use error::{CivicError, Result, ValidationError};
pub use geo::{Coordinates, FixedGeolocator, Geolocator};
pub use guard::{JsonFileLedger, LedgerBackend, MemoryLedger, UpvoteGuard, UpvoteLedger, UpvoteOutcome};
pub use model::{Comment, CommentDraft, Event, EventType, Issue, IssueDraft, IssueType, Location, Status};
pub use query::{CachedProjection, FilterSpec, SortBy, project};
pub use shared::SharedIssueStore;
pub use stats::Statistics;
pub use store::{IssueStore, TransitionPolicy};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
