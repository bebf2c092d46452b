//! World geometry: positions, bounds, player movement, and edge detection.

use serde::{Deserialize, Serialize};

use crate::entities::{SquareId, SubjectSquare};

/// A point in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The center of the world described by `config`.
    pub fn center(config: &WorldConfig) -> Self {
        Self {
            x: config.width / 2.0,
            y: config.height / 2.0,
        }
    }

    /// Clamp this position into the world bounds (hard stop, no bounce).
    pub fn clamped(self, config: &WorldConfig) -> Self {
        Self {
            x: self.x.clamp(0.0, config.width),
            y: self.y.clamp(0.0, config.height),
        }
    }
}

/// World dimensions and timing parameters.
///
/// Loadable from TOML; every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World width in pixels.
    pub width: f32,
    /// World height in pixels.
    pub height: f32,
    /// Player movement speed in pixels per second.
    pub player_speed: f32,
    /// Player collision radius in pixels.
    pub player_radius: f32,
    /// Distance from a boundary edge that counts as "near" it.
    pub edge_threshold: f32,
    /// Total duration of a zone transition (fade out + fade in).
    pub transition_ms: u64,
    /// Pause before the onboarding forest screen auto-advances.
    pub onboarding_pause_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 2000.0,
            height: 2000.0,
            player_speed: 350.0,
            player_radius: 14.0,
            edge_threshold: 100.0,
            transition_ms: 500,
            onboarding_pause_ms: 1500,
        }
    }
}

impl WorldConfig {
    /// Parse a config from a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Currently held movement keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    pub fn is_idle(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }
}

/// Advance the player one game-loop tick.
///
/// Speed is scaled by the frame delta, diagonal movement is normalized so it
/// is not faster than cardinal movement, and the result is clamped to the
/// world bounds every tick.
pub fn step_player(
    position: Position,
    input: &InputState,
    delta_ms: f32,
    config: &WorldConfig,
) -> Position {
    let speed = config.player_speed * delta_ms / 1000.0;

    let mut dx = 0.0;
    let mut dy = 0.0;
    if input.up {
        dy -= speed;
    }
    if input.down {
        dy += speed;
    }
    if input.left {
        dx -= speed;
    }
    if input.right {
        dx += speed;
    }

    if dx != 0.0 && dy != 0.0 {
        let factor = 1.0 / std::f32::consts::SQRT_2;
        dx *= factor;
        dy *= factor;
    }

    Position::new(position.x + dx, position.y + dy).clamped(config)
}

/// The four world boundary edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDirection {
    North,
    South,
    East,
    West,
}

/// Which boundary edge, if any, the position is within the edge threshold of.
///
/// Checked in the order north, south, west, east; corners report the first
/// matching edge.
pub fn near_edge(position: Position, config: &WorldConfig) -> Option<EdgeDirection> {
    if position.y < config.edge_threshold {
        Some(EdgeDirection::North)
    } else if position.y > config.height - config.edge_threshold {
        Some(EdgeDirection::South)
    } else if position.x < config.edge_threshold {
        Some(EdgeDirection::West)
    } else if position.x > config.width - config.edge_threshold {
        Some(EdgeDirection::East)
    } else {
        None
    }
}

/// The square adjacent to `current` in the given direction.
///
/// Placeholder adjacency policy: squares cycle in store order, next for
/// east/south and previous for west/north. Not true spatial adjacency.
pub fn adjacent_square(
    current: &SquareId,
    edge: EdgeDirection,
    squares: &[&SubjectSquare],
) -> Option<SquareId> {
    if squares.len() <= 1 {
        return None;
    }

    let index = squares.iter().position(|s| &s.id == current)?;
    let next = match edge {
        EdgeDirection::East | EdgeDirection::South => (index + 1) % squares.len(),
        EdgeDirection::West | EdgeDirection::North => (index + squares.len() - 1) % squares.len(),
    };
    Some(squares[next].id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::SubjectTheme;

    fn all_held() -> InputState {
        InputState {
            up: false,
            down: true,
            left: false,
            right: true,
        }
    }

    #[test]
    fn test_default_config() {
        let config = WorldConfig::default();
        assert_eq!(config.width, 2000.0);
        assert_eq!(config.player_speed, 350.0);
    }

    #[test]
    fn test_config_from_toml() {
        let config = WorldConfig::from_toml_str("width = 1000.0\ntransition_ms = 800\n").unwrap();
        assert_eq!(config.width, 1000.0);
        assert_eq!(config.transition_ms, 800);
        // Unset fields keep their defaults.
        assert_eq!(config.height, 2000.0);
    }

    #[test]
    fn test_step_player_cardinal() {
        let config = WorldConfig::default();
        let input = InputState {
            right: true,
            ..Default::default()
        };

        // 350 px/s over 100ms = 35 px.
        let pos = step_player(Position::new(100.0, 100.0), &input, 100.0, &config);
        assert!((pos.x - 135.0).abs() < 0.001);
        assert_eq!(pos.y, 100.0);
    }

    #[test]
    fn test_step_player_diagonal_normalized() {
        let config = WorldConfig::default();
        let pos = step_player(Position::new(500.0, 500.0), &all_held(), 100.0, &config);

        let dx = pos.x - 500.0;
        let dy = pos.y - 500.0;
        let distance = (dx * dx + dy * dy).sqrt();
        // Diagonal speed matches cardinal speed.
        assert!((distance - 35.0).abs() < 0.01);
    }

    #[test]
    fn test_step_player_clamps_to_bounds() {
        let config = WorldConfig::default();
        let input = InputState {
            left: true,
            ..Default::default()
        };

        let pos = step_player(Position::new(5.0, 500.0), &input, 1000.0, &config);
        assert_eq!(pos.x, 0.0);

        let input = InputState {
            down: true,
            ..Default::default()
        };
        let pos = step_player(Position::new(500.0, 1990.0), &input, 1000.0, &config);
        assert_eq!(pos.y, 2000.0);
    }

    #[test]
    fn test_near_edge() {
        let config = WorldConfig::default();

        assert_eq!(near_edge(Position::new(500.0, 50.0), &config), Some(EdgeDirection::North));
        assert_eq!(near_edge(Position::new(500.0, 1950.0), &config), Some(EdgeDirection::South));
        assert_eq!(near_edge(Position::new(50.0, 500.0), &config), Some(EdgeDirection::West));
        assert_eq!(near_edge(Position::new(1950.0, 500.0), &config), Some(EdgeDirection::East));
        assert_eq!(near_edge(Position::new(1000.0, 1000.0), &config), None);
    }

    #[test]
    fn test_adjacent_square_cycles() {
        let math = SubjectSquare::new("Math", SubjectTheme::Crystalline);
        let bio = SubjectSquare::new("Biology", SubjectTheme::Organic);
        let history = SubjectSquare::new("History", SubjectTheme::Angular);
        let squares = vec![&math, &bio, &history];

        assert_eq!(
            adjacent_square(&math.id, EdgeDirection::East, &squares),
            Some(bio.id.clone())
        );
        // Previous from the first square wraps to the last.
        assert_eq!(
            adjacent_square(&math.id, EdgeDirection::West, &squares),
            Some(history.id.clone())
        );
        // Next from the last square wraps to the first.
        assert_eq!(
            adjacent_square(&history.id, EdgeDirection::South, &squares),
            Some(math.id.clone())
        );
    }

    #[test]
    fn test_adjacent_square_degenerate() {
        let math = SubjectSquare::new("Math", SubjectTheme::Crystalline);

        let single = vec![&math];
        assert_eq!(adjacent_square(&math.id, EdgeDirection::East, &single), None);

        let bio = SubjectSquare::new("Biology", SubjectTheme::Organic);
        let squares = vec![&math, &bio];
        let unknown = SquareId::from_name("Chemistry");
        assert_eq!(adjacent_square(&unknown, EdgeDirection::East, &squares), None);
    }
}
