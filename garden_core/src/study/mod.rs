//! Study records attached to topics: conversations and exercises.
//!
//! Both collections key their entries by id and reference topics by
//! `TopicId` only - a weak link, no ownership. Cascade removal on topic
//! deletion is the facade's job, via `remove_by_topic`.

mod conversation;
mod exercise;

pub use conversation::*;
pub use exercise::*;
