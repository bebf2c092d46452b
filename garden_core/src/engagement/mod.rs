//! Engagement scoring - pure functions from study history to a 0-100 score.
//!
//! Four signals, each normalized to [0, 1] before weighting:
//! 1. **Conversations**: how many conversations the topic has
//! 2. **Messages**: total messages exchanged across those conversations
//! 3. **Recency**: linear decay from the most recent activity
//! 4. **Exercises**: completed exercise count
//!
//! The weighted sum is scaled to 0-100, clamped, and rounded. The store never
//! computes this itself; interaction handlers recompute and push the result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::study::{Conversation, Exercise};

/// Relative weight of each engagement signal. Weights sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngagementWeights {
    pub conversation_count: f32,
    pub message_count: f32,
    pub recency: f32,
    pub exercise_completion: f32,
}

impl Default for EngagementWeights {
    fn default() -> Self {
        Self {
            conversation_count: 0.2,
            message_count: 0.3,
            recency: 0.2,
            exercise_completion: 0.3,
        }
    }
}

/// Saturation thresholds for signal normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngagementThresholds {
    /// Conversations at or above this count score 1.0.
    pub max_conversations: u32,
    /// Total messages at or above this count score 1.0.
    pub max_messages: u32,
    /// Days after which recency decays to 0.0.
    pub recency_days: f32,
    /// Completed exercises at or above this count score 1.0.
    pub max_exercises: u32,
}

impl Default for EngagementThresholds {
    fn default() -> Self {
        Self {
            max_conversations: 10,
            max_messages: 50,
            recency_days: 30.0,
            max_exercises: 10,
        }
    }
}

/// Configuration for the engagement engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngagementConfig {
    pub weights: EngagementWeights,
    pub thresholds: EngagementThresholds,
}

/// Per-signal sub-scores and raw counts, for diagnostics and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementBreakdown {
    /// Sub-scores scaled to 0-100.
    pub conversation_score: u8,
    pub message_score: u8,
    pub recency_score: u8,
    pub exercise_score: u8,
    /// The combined 0-100 score.
    pub total_score: u8,
    pub details: EngagementDetails,
}

/// Raw counts behind the sub-scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementDetails {
    pub conversation_count: usize,
    pub message_count: usize,
    /// None when the topic has no conversations yet.
    pub days_since_last_activity: Option<f32>,
    pub exercises_completed: usize,
    pub exercises_total: usize,
}

/// Computes engagement scores from study history. Side-effect free; the
/// caller supplies `now` so scoring stays deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngagementEngine {
    config: EngagementConfig,
}

impl EngagementEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: EngagementConfig) -> Self {
        Self { config }
    }

    /// Create an engine with the standard weights and thresholds.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Compute the 0-100 engagement score for a topic's history.
    pub fn score(
        &self,
        conversations: &[&Conversation],
        exercises: &[&Exercise],
        now: DateTime<Utc>,
    ) -> u8 {
        let weights = &self.config.weights;
        let total = self.conversation_score(conversations) * weights.conversation_count
            + self.message_score(conversations) * weights.message_count
            + self.recency_score(conversations, now) * weights.recency
            + self.exercise_score(exercises) * weights.exercise_completion;

        (total * 100.0).clamp(0.0, 100.0).round() as u8
    }

    /// Expose each sub-score and the raw counts behind them.
    pub fn breakdown(
        &self,
        conversations: &[&Conversation],
        exercises: &[&Exercise],
        now: DateTime<Utc>,
    ) -> EngagementBreakdown {
        let days_since = most_recent_update(conversations)
            .map(|last| days_between(last, now));

        EngagementBreakdown {
            conversation_score: to_percent(self.conversation_score(conversations)),
            message_score: to_percent(self.message_score(conversations)),
            recency_score: to_percent(self.recency_score(conversations, now)),
            exercise_score: to_percent(self.exercise_score(exercises)),
            total_score: self.score(conversations, exercises, now),
            details: EngagementDetails {
                conversation_count: conversations.len(),
                message_count: total_messages(conversations),
                days_since_last_activity: days_since,
                exercises_completed: exercises.iter().filter(|e| e.completed).count(),
                exercises_total: exercises.len(),
            },
        }
    }

    fn conversation_score(&self, conversations: &[&Conversation]) -> f32 {
        let count = conversations.len() as f32;
        (count / self.config.thresholds.max_conversations as f32).min(1.0)
    }

    fn message_score(&self, conversations: &[&Conversation]) -> f32 {
        let total = total_messages(conversations) as f32;
        (total / self.config.thresholds.max_messages as f32).min(1.0)
    }

    /// Linear decay: 1.0 at zero days since the last update, 0.0 at the
    /// recency threshold. Topics with no conversations score 0 here.
    fn recency_score(&self, conversations: &[&Conversation], now: DateTime<Utc>) -> f32 {
        let Some(last) = most_recent_update(conversations) else {
            return 0.0;
        };

        let days = days_between(last, now);
        if days >= self.config.thresholds.recency_days {
            0.0
        } else {
            1.0 - days / self.config.thresholds.recency_days
        }
    }

    fn exercise_score(&self, exercises: &[&Exercise]) -> f32 {
        let completed = exercises.iter().filter(|e| e.completed).count() as f32;
        (completed / self.config.thresholds.max_exercises as f32).min(1.0)
    }
}

fn total_messages(conversations: &[&Conversation]) -> usize {
    conversations.iter().map(|c| c.messages.len()).sum()
}

fn most_recent_update(conversations: &[&Conversation]) -> Option<DateTime<Utc>> {
    conversations.iter().map(|c| c.updated_at).max()
}

fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f32 {
    (later - earlier).num_milliseconds() as f32 / (1000.0 * 60.0 * 60.0 * 24.0)
}

fn to_percent(score: f32) -> u8 {
    (score * 100.0).round().clamp(0.0, 100.0) as u8
}
