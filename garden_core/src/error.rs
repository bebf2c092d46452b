//! Error types for garden core operations.

use thiserror::Error;

use garden_world::StoreError;

use crate::study::{ConversationId, ExerciseId};

/// Errors surfaced by the core's stores and facade.
///
/// None of these ever become panics; operating on a missing entity always
/// yields a typed error the caller can absorb.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GardenError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    #[error("exercise not found: {0}")]
    ExerciseNotFound(ExerciseId),

    #[error("topic name must not be empty")]
    EmptyTopicName,

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedSnapshotVersion { found: u32, expected: u32 },
}
