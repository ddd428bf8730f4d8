//! Typed sub-clients for each Zep resource family.

pub mod document;
pub mod edge;
pub mod episode;
pub mod graph;
pub mod node;
pub mod thread;
pub mod user;

pub use document::DocumentClient;
pub use edge::EdgeClient;
pub use episode::EpisodeClient;
pub use graph::{GraphClient, GraphOwner, MAX_QUERY_LENGTH};
pub use node::NodeClient;
pub use thread::ThreadClient;
pub use user::UserClient;

use crate::error::{Result, ZepError};

/// Reject empty or whitespace-only identifiers before any request is made.
pub(crate) fn require_id<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(ZepError::InvalidArgument(format!("{} must not be empty", what)));
    }
    Ok(value)
}
