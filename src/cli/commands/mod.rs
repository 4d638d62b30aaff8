//! Command implementations.
//!
//! Session commands take the [`Session`](super::Session) they act on and
//! write their result to `out` as text or JSON; `version` and `schema` run
//! outside a session.

pub mod comment;
pub mod list;
pub mod mine;
pub mod report;
pub mod schema;
pub mod search;
pub mod show;
pub mod stats;
pub mod status;
pub mod upvote;
pub mod version;
