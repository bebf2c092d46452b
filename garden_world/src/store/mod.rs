//! Topic store - the durable source of truth for topics and subject squares.

mod snapshot;

pub use snapshot::*;

use indexmap::IndexMap;
use tracing::debug;

use crate::entities::{SquareId, SubjectSquare, SubjectTheme, Topic, TopicId};
use crate::error::StoreError;
use crate::world::Position;

/// Owns the topic and subject-square collections and every mutation on them.
///
/// Collections are insertion-ordered, so iteration (and therefore snapshot
/// layout and graph tie-breaking) is deterministic.
#[derive(Debug, Clone, Default)]
pub struct TopicStore {
    topics: IndexMap<TopicId, Topic>,
    squares: IndexMap<SquareId, SubjectSquare>,
}

impl TopicStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a topic in the given square at the given position.
    ///
    /// The new topic starts with zero engagement and no relationships, and its
    /// id is appended to the square's topic list.
    pub fn add_topic(
        &mut self,
        name: impl Into<String>,
        square_id: &SquareId,
        position: Position,
    ) -> Result<TopicId, StoreError> {
        let square = self
            .squares
            .get_mut(square_id)
            .ok_or_else(|| StoreError::ZoneNotFound(square_id.clone()))?;

        let topic = Topic::new(name, square_id.clone(), position);
        let id = topic.id;
        square.topic_ids.push(id);
        self.topics.insert(id, topic);

        debug!(topic = %id, square = %square_id, "topic added");
        Ok(id)
    }

    /// Rename a topic.
    pub fn rename_topic(&mut self, id: TopicId, name: impl Into<String>) -> Result<(), StoreError> {
        let topic = self.topics.get_mut(&id).ok_or(StoreError::TopicNotFound(id))?;
        topic.name = name.into();
        Ok(())
    }

    /// Move a topic to a new world position.
    pub fn update_position(&mut self, id: TopicId, position: Position) -> Result<(), StoreError> {
        let topic = self.topics.get_mut(&id).ok_or(StoreError::TopicNotFound(id))?;
        topic.position = position;
        Ok(())
    }

    /// Set a topic's engagement score, clamped into [0, 100].
    pub fn set_engagement(&mut self, id: TopicId, score: i32) -> Result<(), StoreError> {
        let topic = self.topics.get_mut(&id).ok_or(StoreError::TopicNotFound(id))?;
        topic.set_engagement(score);
        debug!(topic = %id, score = topic.engagement_score, "engagement updated");
        Ok(())
    }

    /// Add a symmetric relationship edge between two topics.
    ///
    /// Idempotent: an existing edge is left alone. Self-relationships are
    /// rejected.
    pub fn add_relationship(&mut self, a: TopicId, b: TopicId) -> Result<(), StoreError> {
        if a == b {
            return Err(StoreError::SelfRelationship(a));
        }
        if !self.topics.contains_key(&b) {
            return Err(StoreError::TopicNotFound(b));
        }

        let topic_a = self.topics.get_mut(&a).ok_or(StoreError::TopicNotFound(a))?;
        if !topic_a.related_topic_ids.contains(&b) {
            topic_a.related_topic_ids.push(b);
        }
        let topic_b = self.topics.get_mut(&b).ok_or(StoreError::TopicNotFound(b))?;
        if !topic_b.related_topic_ids.contains(&a) {
            topic_b.related_topic_ids.push(a);
        }

        debug!(from = %a, to = %b, "relationship added");
        Ok(())
    }

    /// Remove the relationship edge between two topics from both sides.
    pub fn remove_relationship(&mut self, a: TopicId, b: TopicId) -> Result<(), StoreError> {
        if !self.topics.contains_key(&b) {
            return Err(StoreError::TopicNotFound(b));
        }

        let topic_a = self.topics.get_mut(&a).ok_or(StoreError::TopicNotFound(a))?;
        topic_a.related_topic_ids.retain(|id| *id != b);
        let topic_b = self.topics.get_mut(&b).ok_or(StoreError::TopicNotFound(b))?;
        topic_b.related_topic_ids.retain(|id| *id != a);
        Ok(())
    }

    /// Delete a topic, stripping it from its square's topic list and from
    /// every other topic's relationship list.
    ///
    /// The relationship sweep visits every topic (O(n)); acceptable at this
    /// scale and the only way to guarantee no dangling edges.
    pub fn delete_topic(&mut self, id: TopicId) -> Result<Topic, StoreError> {
        let topic = self
            .topics
            .shift_remove(&id)
            .ok_or(StoreError::TopicNotFound(id))?;

        if let Some(square) = self.squares.get_mut(&topic.subject_square) {
            square.topic_ids.retain(|tid| *tid != id);
        }

        for other in self.topics.values_mut() {
            other.related_topic_ids.retain(|rid| *rid != id);
        }

        debug!(topic = %id, "topic deleted");
        Ok(topic)
    }

    /// Create a subject square, or update one in place when the derived slug
    /// already exists.
    ///
    /// Re-creation is an idempotent update: name and theme are refreshed, the
    /// square's topic list is preserved.
    pub fn add_subject_square(&mut self, name: impl Into<String>, theme: SubjectTheme) -> SquareId {
        let name = name.into();
        let id = SquareId::from_name(&name);

        if let Some(existing) = self.squares.get_mut(&id) {
            existing.name = name;
            existing.theme = theme;
        } else {
            self.squares.insert(id.clone(), SubjectSquare::new(name, theme));
        }

        debug!(square = %id, "subject square upserted");
        id
    }

    /// Get a topic by id.
    pub fn topic(&self, id: TopicId) -> Option<&Topic> {
        self.topics.get(&id)
    }

    /// All topics in a subject square, in store order.
    pub fn topics_by_subject(&self, square_id: &SquareId) -> Vec<&Topic> {
        self.topics
            .values()
            .filter(|t| &t.subject_square == square_id)
            .collect()
    }

    /// Get a subject square by id.
    pub fn square(&self, id: &SquareId) -> Option<&SubjectSquare> {
        self.squares.get(id)
    }

    /// All subject squares, in insertion order.
    pub fn all_squares(&self) -> impl Iterator<Item = &SubjectSquare> {
        self.squares.values()
    }

    /// All topics, in insertion order.
    pub fn all_topics(&self) -> impl Iterator<Item = &Topic> {
        self.topics.values()
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn square_count(&self) -> usize {
        self.squares.len()
    }
}
