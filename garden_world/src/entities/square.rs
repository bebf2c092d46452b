//! Subject square definitions - themed world regions grouping topics.

use serde::{Deserialize, Serialize};

use super::TopicId;

/// Identifier for subject squares: a slug derived deterministically from the
/// square's name. Two squares with the same name share an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SquareId(pub String);

impl SquareId {
    /// Derive a square id from a display name: lowercase with whitespace runs
    /// replaced by hyphens.
    pub fn from_name(name: &str) -> Self {
        let slug = name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        Self(slug)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SquareId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visual themes for subject squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectTheme {
    Crystalline,
    Organic,
    Angular,
}

/// A subject square is a distinct themed world area grouping related topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectSquare {
    pub id: SquareId,
    pub name: String,
    pub theme: SubjectTheme,
    /// Topics planted in this square, in insertion order.
    pub topic_ids: Vec<TopicId>,
}

impl SubjectSquare {
    /// Create a new empty square. The id is derived from the name.
    pub fn new(name: impl Into<String>, theme: SubjectTheme) -> Self {
        let name = name.into();
        Self {
            id: SquareId::from_name(&name),
            name,
            theme,
            topic_ids: Vec::new(),
        }
    }
}

/// Predefined subjects offered during onboarding.
pub fn predefined_subjects() -> Vec<(&'static str, SubjectTheme)> {
    vec![
        ("Mathematics", SubjectTheme::Crystalline),
        ("Physics", SubjectTheme::Crystalline),
        ("Biology", SubjectTheme::Organic),
        ("Chemistry", SubjectTheme::Organic),
        ("History", SubjectTheme::Angular),
        ("Literature", SubjectTheme::Angular),
        ("Philosophy", SubjectTheme::Angular),
    ]
}
