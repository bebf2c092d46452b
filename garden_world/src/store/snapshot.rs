//! Persisted snapshot schema for the topic store.
//!
//! Collections serialize as ordered `(id, entity)` pairs so the on-disk layout
//! is independent of the in-memory map type, and a version field gates
//! deserialization of incompatible layouts.

use serde::{Deserialize, Serialize};

use super::TopicStore;
use crate::entities::{SquareId, SubjectSquare, Topic, TopicId};
use crate::error::StoreError;

/// Current topic store snapshot layout version.
pub const TOPIC_SNAPSHOT_VERSION: u32 = 1;

/// The persisted form of a [`TopicStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicStoreSnapshot {
    pub version: u32,
    pub topics: Vec<(TopicId, Topic)>,
    pub subject_squares: Vec<(SquareId, SubjectSquare)>,
}

impl TopicStore {
    /// Capture the store as a persistable snapshot, preserving insertion order.
    pub fn to_snapshot(&self) -> TopicStoreSnapshot {
        TopicStoreSnapshot {
            version: TOPIC_SNAPSHOT_VERSION,
            topics: self.all_topics().map(|t| (t.id, t.clone())).collect(),
            subject_squares: self
                .all_squares()
                .map(|s| (s.id.clone(), s.clone()))
                .collect(),
        }
    }

    /// Rebuild a store from a snapshot.
    pub fn from_snapshot(snapshot: TopicStoreSnapshot) -> Result<Self, StoreError> {
        if snapshot.version != TOPIC_SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedSnapshotVersion {
                found: snapshot.version,
                expected: TOPIC_SNAPSHOT_VERSION,
            });
        }

        let mut store = TopicStore::new();
        for (id, square) in snapshot.subject_squares {
            store.squares.insert(id, square);
        }
        for (id, topic) in snapshot.topics {
            store.topics.insert(id, topic);
        }
        Ok(store)
    }
}
