//! Entity definitions for the garden world.

mod square;
mod topic;

pub use square::*;
pub use topic::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicId(pub Uuid);

impl TopicId {
    /// Create a new random topic ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a topic ID from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create a nil/empty topic ID (useful for defaults).
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for TopicId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TopicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
