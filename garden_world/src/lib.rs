//! # Garden World
//!
//! The "World Bible" crate - entity definitions, the topic store, and world
//! geometry for the Knowledge Garden. This crate is the single source of truth
//! for topics, subject squares, and player-facing world rules; it contains no
//! scoring or session logic.

pub mod entities;
pub mod error;
pub mod store;
pub mod world;

pub use entities::*;
pub use error::*;
pub use store::*;
pub use world::*;
