//! Exercises - practice items attached to a topic.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use garden_world::TopicId;

use crate::error::GardenError;

/// Unique identifier for exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExerciseId(pub Uuid);

impl ExerciseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for ExerciseId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds of practice exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    Problem,
    Quiz,
    Reflection,
}

/// A practice item belonging to one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    pub topic_id: TopicId,
    pub kind: ExerciseKind,
    pub prompt: String,
    pub user_answer: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    pub fn new(topic_id: TopicId, kind: ExerciseKind, prompt: impl Into<String>) -> Self {
        Self {
            id: ExerciseId::new(),
            topic_id,
            kind,
            prompt: prompt.into(),
            user_answer: None,
            completed: false,
            created_at: Utc::now(),
        }
    }
}

/// Owns every exercise, keyed by id in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ExerciseStore {
    exercises: IndexMap<ExerciseId, Exercise>,
}

/// Persisted layout version for exercise snapshots.
pub const EXERCISE_SNAPSHOT_VERSION: u32 = 1;

/// The persisted form of an [`ExerciseStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseStoreSnapshot {
    pub version: u32,
    pub exercises: Vec<(ExerciseId, Exercise)>,
}

impl ExerciseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an exercise for a topic.
    pub fn create(
        &mut self,
        topic_id: TopicId,
        kind: ExerciseKind,
        prompt: impl Into<String>,
    ) -> ExerciseId {
        let exercise = Exercise::new(topic_id, kind, prompt);
        let id = exercise.id;
        self.exercises.insert(id, exercise);
        debug!(exercise = %id, topic = %topic_id, "exercise created");
        id
    }

    /// Delete an exercise.
    pub fn delete(&mut self, id: ExerciseId) -> Result<Exercise, GardenError> {
        self.exercises
            .shift_remove(&id)
            .ok_or(GardenError::ExerciseNotFound(id))
    }

    pub fn get(&self, id: ExerciseId) -> Option<&Exercise> {
        self.exercises.get(&id)
    }

    /// All exercises for a topic, oldest first.
    pub fn by_topic(&self, topic_id: TopicId) -> Vec<&Exercise> {
        let mut result: Vec<&Exercise> = self
            .exercises
            .values()
            .filter(|e| e.topic_id == topic_id)
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        result
    }

    /// Record the user's answer without completing the exercise.
    pub fn submit_answer(&mut self, id: ExerciseId, answer: impl Into<String>) -> Result<(), GardenError> {
        let exercise = self.exercises.get_mut(&id).ok_or(GardenError::ExerciseNotFound(id))?;
        exercise.user_answer = Some(answer.into());
        Ok(())
    }

    /// Mark an exercise completed.
    pub fn mark_complete(&mut self, id: ExerciseId) -> Result<(), GardenError> {
        let exercise = self.exercises.get_mut(&id).ok_or(GardenError::ExerciseNotFound(id))?;
        exercise.completed = true;
        Ok(())
    }

    /// Clear the answer and completion flag.
    pub fn reset(&mut self, id: ExerciseId) -> Result<(), GardenError> {
        let exercise = self.exercises.get_mut(&id).ok_or(GardenError::ExerciseNotFound(id))?;
        exercise.user_answer = None;
        exercise.completed = false;
        Ok(())
    }

    /// Completed fraction for a topic's exercises in 0-100; 0 when the topic
    /// has no exercises.
    pub fn completion_rate(&self, topic_id: TopicId) -> f32 {
        let exercises = self.by_topic(topic_id);
        if exercises.is_empty() {
            return 0.0;
        }
        let completed = exercises.iter().filter(|e| e.completed).count();
        completed as f32 / exercises.len() as f32 * 100.0
    }

    /// How many of a topic's exercises are completed.
    pub fn completed_count(&self, topic_id: TopicId) -> usize {
        self.exercises
            .values()
            .filter(|e| e.topic_id == topic_id && e.completed)
            .count()
    }

    /// Remove every exercise attached to a topic. Returns how many were
    /// removed. Used by cascading topic deletion.
    pub fn remove_by_topic(&mut self, topic_id: TopicId) -> usize {
        let before = self.exercises.len();
        self.exercises.retain(|_, e| e.topic_id != topic_id);
        before - self.exercises.len()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Capture the store as a persistable snapshot.
    pub fn to_snapshot(&self) -> ExerciseStoreSnapshot {
        ExerciseStoreSnapshot {
            version: EXERCISE_SNAPSHOT_VERSION,
            exercises: self.exercises.iter().map(|(id, e)| (*id, e.clone())).collect(),
        }
    }

    /// Rebuild the store from a snapshot.
    pub fn from_snapshot(snapshot: ExerciseStoreSnapshot) -> Result<Self, GardenError> {
        if snapshot.version != EXERCISE_SNAPSHOT_VERSION {
            return Err(GardenError::UnsupportedSnapshotVersion {
                found: snapshot.version,
                expected: EXERCISE_SNAPSHOT_VERSION,
            });
        }
        let mut store = Self::new();
        for (id, exercise) in snapshot.exercises {
            store.exercises.insert(id, exercise);
        }
        Ok(store)
    }
}
