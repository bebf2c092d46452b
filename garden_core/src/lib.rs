//! # Garden Core
//!
//! The "brain" of the Knowledge Garden. This crate interfaces with
//! `garden_world`, scores topic engagement from study history, runs graph
//! queries over topic relationships, and drives the navigation state machine
//! that coordinates orb-carrying, zone transitions, and onboarding.
//!
//! ## Core Components
//!
//! - **engagement**: pure scoring of interaction history into 0-100 engagement
//! - **graph**: traversal, shortest path, hub/bridge detection over topic edges
//! - **study**: conversations and exercises attached to topics
//! - **navigation**: orb mode, timed zone transitions, onboarding steps
//! - **garden**: a facade owning every store and exposing the command surface
//!
//! ## Design Philosophy
//!
//! - **Single-threaded**: one logical thread processes discrete events; every
//!   mutation is atomic with respect to it
//! - **Tick-driven**: all timed behavior runs off caller-supplied clocks, so
//!   the whole core is deterministic under test
//! - **No-crash**: operations on missing entities return typed errors, never
//!   panic

pub mod engagement;
pub mod error;
pub mod garden;
pub mod graph;
pub mod navigation;
pub mod seed;
pub mod study;

pub use engagement::*;
pub use error::*;
pub use garden::*;
pub use graph::*;
pub use navigation::*;
pub use study::*;
