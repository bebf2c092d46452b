//! Conversations - message threads attached to a topic.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use garden_world::TopicId;

use crate::error::GardenError;

/// Unique identifier for conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub Uuid);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single message within a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Default title before the first message arrives.
const UNTITLED: &str = "New Conversation";

/// Titles longer than this are truncated with an ellipsis.
const TITLE_MAX_CHARS: usize = 50;

/// A conversation belongs to exactly one topic and holds an ordered message
/// list. `updated_at` drives recency sorting and engagement scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub topic_id: TopicId,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create an empty conversation. Without an explicit title, one is derived
    /// from the first message later.
    pub fn new(topic_id: TopicId, title: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            topic_id,
            title: title.unwrap_or_else(|| UNTITLED.to_string()),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and bump `updated_at`. The first message titles an
    /// untitled conversation.
    pub fn push_message(
        &mut self,
        role: MessageRole,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> MessageId {
        let content = content.into();
        if self.messages.is_empty() && self.title == UNTITLED {
            self.title = derive_title(&content);
        }

        let message = Message {
            id: MessageId::new(),
            role,
            content,
            timestamp,
        };
        let id = message.id;
        self.messages.push(message);
        self.updated_at = timestamp;
        id
    }
}

/// Derive a conversation title from a message: whitespace collapsed, kept
/// verbatim up to 50 characters, otherwise cut at 47 and ellipsized.
pub fn derive_title(message: &str) -> String {
    let cleaned = message.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() <= TITLE_MAX_CHARS {
        return cleaned;
    }
    let cut: String = cleaned.chars().take(TITLE_MAX_CHARS - 3).collect();
    format!("{}...", cut.trim_end())
}

/// Owns every conversation, keyed by id in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    conversations: IndexMap<ConversationId, Conversation>,
}

/// Persisted layout version for conversation snapshots.
pub const CONVERSATION_SNAPSHOT_VERSION: u32 = 1;

/// The persisted form of a [`ConversationStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationStoreSnapshot {
    pub version: u32,
    pub conversations: Vec<(ConversationId, Conversation)>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation for a topic, optionally titled.
    pub fn create(&mut self, topic_id: TopicId, title: Option<&str>) -> ConversationId {
        let conversation = Conversation::new(topic_id, title.map(str::to_string));
        let id = conversation.id;
        self.conversations.insert(id, conversation);
        debug!(conversation = %id, topic = %topic_id, "conversation created");
        id
    }

    /// Delete a conversation.
    pub fn delete(&mut self, id: ConversationId) -> Result<Conversation, GardenError> {
        self.conversations
            .shift_remove(&id)
            .ok_or(GardenError::ConversationNotFound(id))
    }

    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations.get(&id)
    }

    /// All conversations for a topic, most recently updated first.
    pub fn by_topic(&self, topic_id: TopicId) -> Vec<&Conversation> {
        let mut result: Vec<&Conversation> = self
            .conversations
            .values()
            .filter(|c| c.topic_id == topic_id)
            .collect();
        result.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        result
    }

    /// Append a message to a conversation at the given time.
    pub fn add_message(
        &mut self,
        id: ConversationId,
        role: MessageRole,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<MessageId, GardenError> {
        let conversation = self
            .conversations
            .get_mut(&id)
            .ok_or(GardenError::ConversationNotFound(id))?;
        Ok(conversation.push_message(role, content, now))
    }

    /// Replace a conversation's title.
    pub fn set_title(&mut self, id: ConversationId, title: impl Into<String>) -> Result<(), GardenError> {
        let conversation = self
            .conversations
            .get_mut(&id)
            .ok_or(GardenError::ConversationNotFound(id))?;
        conversation.title = title.into();
        conversation.updated_at = Utc::now();
        Ok(())
    }

    /// Remove every conversation attached to a topic. Returns how many were
    /// removed. Used by cascading topic deletion.
    pub fn remove_by_topic(&mut self, topic_id: TopicId) -> usize {
        let before = self.conversations.len();
        self.conversations.retain(|_, c| c.topic_id != topic_id);
        before - self.conversations.len()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Capture the store as a persistable snapshot.
    pub fn to_snapshot(&self) -> ConversationStoreSnapshot {
        ConversationStoreSnapshot {
            version: CONVERSATION_SNAPSHOT_VERSION,
            conversations: self
                .conversations
                .iter()
                .map(|(id, c)| (*id, c.clone()))
                .collect(),
        }
    }

    /// Rebuild the store from a snapshot.
    pub fn from_snapshot(snapshot: ConversationStoreSnapshot) -> Result<Self, GardenError> {
        if snapshot.version != CONVERSATION_SNAPSHOT_VERSION {
            return Err(GardenError::UnsupportedSnapshotVersion {
                found: snapshot.version,
                expected: CONVERSATION_SNAPSHOT_VERSION,
            });
        }
        let mut store = Self::new();
        for (id, conversation) in snapshot.conversations {
            store.conversations.insert(id, conversation);
        }
        Ok(store)
    }
}
