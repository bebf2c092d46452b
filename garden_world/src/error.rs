//! Error types for garden world operations.

use thiserror::Error;

use crate::entities::{SquareId, TopicId};

/// Errors surfaced by the topic store.
///
/// Operations on missing entities report these instead of silently doing
/// nothing, and nothing here is ever turned into a panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("topic not found: {0}")]
    TopicNotFound(TopicId),

    #[error("subject square not found: {0}")]
    ZoneNotFound(SquareId),

    #[error("a topic cannot relate to itself: {0}")]
    SelfRelationship(TopicId),

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedSnapshotVersion { found: u32, expected: u32 },
}
