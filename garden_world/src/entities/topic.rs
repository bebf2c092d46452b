//! Topic definitions - the learnable units of the garden, rendered as trees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{SquareId, TopicId};
use crate::world::Position;

/// A topic is a learnable unit, visualized as a tree whose growth reflects
/// engagement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,

    /// Display name of the topic.
    pub name: String,

    /// The subject square (zone) this topic belongs to.
    pub subject_square: SquareId,

    /// Location in world coordinates.
    pub position: Position,

    /// When this topic was planted.
    pub created_at: DateTime<Utc>,

    /// Engagement score (0-100), drives the growth stage.
    pub engagement_score: u8,

    /// Edges in the topic graph. Always symmetric: if A lists B, B lists A.
    pub related_topic_ids: Vec<TopicId>,
}

impl Topic {
    /// Create a new topic in the given square at the given position.
    ///
    /// New topics start with zero engagement and no relationships.
    pub fn new(name: impl Into<String>, subject_square: SquareId, position: Position) -> Self {
        Self {
            id: TopicId::new(),
            name: name.into(),
            subject_square,
            position,
            created_at: Utc::now(),
            engagement_score: 0,
            related_topic_ids: Vec::new(),
        }
    }

    /// Set the engagement score, clamping into [0, 100].
    pub fn set_engagement(&mut self, score: i32) {
        self.engagement_score = score.clamp(0, 100) as u8;
    }

    /// The growth stage derived from the current engagement score.
    pub fn growth_stage(&self) -> GrowthStage {
        GrowthStage::from_score(self.engagement_score)
    }

    /// Check whether this topic has a relationship edge to another topic.
    pub fn is_related_to(&self, other: TopicId) -> bool {
        self.related_topic_ids.contains(&other)
    }
}

/// Visual/maturity buckets derived from engagement score.
///
/// The ordering is meaningful: a higher engagement score never maps to an
/// earlier stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthStage {
    Seedling,
    Sapling,
    Young,
    Mature,
    Ancient,
}

impl GrowthStage {
    /// Classify an engagement score into a growth stage.
    ///
    /// Total over 0-100 and monotonic in the score.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=9 => GrowthStage::Seedling,
            10..=29 => GrowthStage::Sapling,
            30..=59 => GrowthStage::Young,
            60..=84 => GrowthStage::Mature,
            _ => GrowthStage::Ancient,
        }
    }
}

impl std::fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GrowthStage::Seedling => "seedling",
            GrowthStage::Sapling => "sapling",
            GrowthStage::Young => "young",
            GrowthStage::Mature => "mature",
            GrowthStage::Ancient => "ancient",
        };
        write!(f, "{}", name)
    }
}
