//! Durable player state: where the player is, which zone they are in, and
//! whether they have finished onboarding.

use serde::{Deserialize, Serialize};

use garden_world::{Position, SquareId, WorldConfig};

use crate::error::GardenError;

/// Persisted layout version for player snapshots.
pub const PLAYER_SNAPSHOT_VERSION: u32 = 1;

/// The player's durable world state. Unlike [`super::NavigationMachine`],
/// everything here survives a restart.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    current_square: Option<SquareId>,
    position: Position,
    companion_style: String,
    onboarding_complete: bool,
}

impl PlayerState {
    /// A fresh player: no zone yet, centered in the world, default companion.
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            current_square: None,
            position: Position::center(config),
            companion_style: "wisp".to_string(),
            onboarding_complete: false,
        }
    }

    pub fn current_square(&self) -> Option<&SquareId> {
        self.current_square.as_ref()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn companion_style(&self) -> &str {
        &self.companion_style
    }

    pub fn onboarding_complete(&self) -> bool {
        self.onboarding_complete
    }

    /// Enter a zone and recenter.
    pub fn enter_square(&mut self, square: SquareId, config: &WorldConfig) {
        self.current_square = Some(square);
        self.position = Position::center(config);
    }

    pub fn set_position(&mut self, position: Position, config: &WorldConfig) {
        self.position = position.clamped(config);
    }

    /// Offset the position, clamped to the world bounds.
    pub fn move_by(&mut self, dx: f32, dy: f32, config: &WorldConfig) {
        self.position = Position::new(self.position.x + dx, self.position.y + dy).clamped(config);
    }

    pub fn set_companion_style(&mut self, style: impl Into<String>) {
        self.companion_style = style.into();
    }

    pub fn complete_onboarding(&mut self) {
        self.onboarding_complete = true;
    }

    /// Return to the pre-onboarding state: no zone, centered, flag cleared.
    /// The onboarding step machine is reset separately by its owner.
    pub fn reset_onboarding(&mut self, config: &WorldConfig) {
        self.onboarding_complete = false;
        self.current_square = None;
        self.position = Position::center(config);
    }

    /// Capture the durable player state.
    pub fn to_snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            version: PLAYER_SNAPSHOT_VERSION,
            current_square: self.current_square.clone(),
            position: self.position,
            companion_style: self.companion_style.clone(),
            onboarding_complete: self.onboarding_complete,
        }
    }

    /// Rebuild player state from a snapshot. The position is re-clamped in
    /// case the world dimensions shrank since it was captured.
    pub fn from_snapshot(
        snapshot: PlayerSnapshot,
        config: &WorldConfig,
    ) -> Result<Self, GardenError> {
        if snapshot.version != PLAYER_SNAPSHOT_VERSION {
            return Err(GardenError::UnsupportedSnapshotVersion {
                found: snapshot.version,
                expected: PLAYER_SNAPSHOT_VERSION,
            });
        }

        Ok(Self {
            current_square: snapshot.current_square,
            position: snapshot.position.clamped(config),
            companion_style: snapshot.companion_style,
            onboarding_complete: snapshot.onboarding_complete,
        })
    }
}

/// Serialized form of [`PlayerState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub version: u32,
    pub current_square: Option<SquareId>,
    pub position: Position,
    pub companion_style: String,
    pub onboarding_complete: bool,
}
