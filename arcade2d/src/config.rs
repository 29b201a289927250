//! Scene configuration.
//!
//! Every tunable of the scene lives here so the two shipped layouts (edge
//! spawning and top-right spawning) are presets rather than separate scenes.
//! Configs round-trip through JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ArcadeError, Result};
use crate::input::ScreenSide;
use crate::math::{Size, Vec2};
use crate::physics::BodyShape;
use crate::session::GameOverRules;
use crate::spawner::SpawnPosition;

/// Vertical push applied while a side of the screen is held.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Thrust {
    Up,
    Down,
    None,
}

impl Thrust {
    /// Force vector for a thrust of the given magnitude.
    pub fn force(self, magnitude: f32) -> Vec2 {
        match self {
            Thrust::Up => Vec2::new(0.0, magnitude),
            Thrust::Down => Vec2::new(0.0, -magnitude),
            Thrust::None => Vec2::ZERO,
        }
    }
}

/// Which thrust each half of the screen produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceMapping {
    pub left: Thrust,
    pub right: Thrust,
}

impl ForceMapping {
    pub fn thrust_for(&self, side: ScreenSide) -> Thrust {
        match side {
            ScreenSide::Left => self.left,
            ScreenSide::Right => self.right,
        }
    }
}

impl Default for ForceMapping {
    fn default() -> Self {
        Self {
            left: Thrust::Up,
            right: Thrust::Down,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Drawn radius, used for bounds.
    pub radius: f32,
    /// Collision radius.
    pub body_radius: f32,
    /// Distance of the spawn point below the top of the frame.
    pub top_offset: f32,
    /// Force magnitude applied per frame while a side is held.
    pub thrust: f32,
    pub density: f32,
    /// Keep the player between the bottom and top of the frame.
    pub clamp_vertical: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            radius: 25.0,
            body_radius: 10.0,
            top_offset: 200.0,
            thrust: 1500.0,
            density: 0.01,
            clamp_vertical: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorConfig {
    /// Floor height as a fraction of the frame height.
    pub height_fraction: f32,
    pub thickness: f32,
    pub restitution: f32,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            height_fraction: 0.25,
            thickness: 1.0,
            restitution: 0.5,
        }
    }
}

/// Obstacle appearance and body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObstacleShape {
    /// Textured square sprite with a matching box body.
    Square { size: f32 },
    /// Drawn circle with a smaller round body.
    Circle { radius: f32, body_radius: f32 },
}

impl ObstacleShape {
    /// Visual size used for bounds checks.
    pub fn visual_size(&self) -> Vec2 {
        match *self {
            ObstacleShape::Square { size } => Vec2::splat(size),
            ObstacleShape::Circle { radius, .. } => Vec2::splat(radius * 2.0),
        }
    }

    /// Collision shape handed to the physics backend.
    pub fn body_shape(&self) -> BodyShape {
        match *self {
            ObstacleShape::Square { size } => BodyShape::Rect {
                width: size,
                height: size,
            },
            ObstacleShape::Circle { body_radius, .. } => BodyShape::Circle {
                radius: body_radius,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    pub shape: ObstacleShape,
    /// Initial horizontal speed, directed toward the far half of the screen.
    pub speed: f32,
    pub restitution: f32,
    pub density: f32,
    /// Remove obstacles after this many seconds even if still on screen.
    pub lifetime: Option<f64>,
    /// Upper bound on concurrently active obstacles.
    pub max_active: Option<usize>,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            shape: ObstacleShape::Square { size: 70.0 },
            speed: 200.0,
            restitution: 0.5,
            density: 0.01,
            lifetime: None,
            max_active: Some(32),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Seconds between spawns. The first spawn happens immediately.
    pub interval: f64,
    pub position: SpawnPosition,
    /// Seed for the spawn RNG; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            interval: 1.0,
            position: SpawnPosition::RandomEdge {
                height_fraction: 0.275,
            },
            seed: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub frame: Size,
    pub gravity: Vec2,
    pub player: PlayerConfig,
    pub floor: FloorConfig,
    pub obstacles: ObstacleConfig,
    pub spawn: SpawnConfig,
    pub controls: ForceMapping,
    pub rules: GameOverRules,
    /// Longest single physics step; longer frames are split.
    pub max_physics_step: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::edge_spawn()
    }
}

impl SceneConfig {
    /// Obstacles enter from a random side edge every second and are culled
    /// only when they leave the frame.
    pub fn edge_spawn() -> Self {
        Self {
            frame: Size::default(),
            gravity: Vec2::new(0.0, -135.0),
            player: PlayerConfig::default(),
            floor: FloorConfig::default(),
            obstacles: ObstacleConfig::default(),
            spawn: SpawnConfig::default(),
            controls: ForceMapping::default(),
            rules: GameOverRules::default(),
            max_physics_step: 1.0 / 60.0,
        }
    }

    /// Round obstacles drop from near the top-right corner every three
    /// seconds and expire after five.
    pub fn top_right() -> Self {
        let mut config = Self::edge_spawn();
        config.obstacles.shape = ObstacleShape::Circle {
            radius: 25.0,
            body_radius: 15.0,
        };
        config.obstacles.speed = 150.0;
        config.obstacles.lifetime = Some(5.0);
        config.spawn.interval = 3.0;
        config.spawn.position = SpawnPosition::Fixed {
            x_fraction: 0.9,
            y_fraction: 0.9,
        };
        config
    }

    #[must_use]
    pub fn with_frame(mut self, width: f32, height: f32) -> Self {
        self.frame = Size::new(width, height);
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.spawn.seed = Some(seed);
        self
    }

    /// Player spawn point: horizontally centered, `top_offset` below the top.
    pub fn player_start(&self) -> Vec2 {
        Vec2::new(self.frame.mid_x(), self.frame.height - self.player.top_offset)
    }

    pub fn floor_y(&self) -> f32 {
        self.frame.height * self.floor.height_fraction
    }

    /// Check every value the loop relies on.
    pub fn validate(&self) -> Result<()> {
        positive("frame.width", self.frame.width)?;
        positive("frame.height", self.frame.height)?;
        finite("gravity.x", self.gravity.x)?;
        finite("gravity.y", self.gravity.y)?;

        positive("player.radius", self.player.radius)?;
        positive("player.body_radius", self.player.body_radius)?;
        finite("player.top_offset", self.player.top_offset)?;
        non_negative("player.thrust", self.player.thrust)?;
        positive("player.density", self.player.density)?;

        fraction("floor.height_fraction", self.floor.height_fraction)?;
        positive("floor.thickness", self.floor.thickness)?;
        non_negative("floor.restitution", self.floor.restitution)?;

        match self.obstacles.shape {
            ObstacleShape::Square { size } => positive("obstacles.shape.size", size)?,
            ObstacleShape::Circle {
                radius,
                body_radius,
            } => {
                positive("obstacles.shape.radius", radius)?;
                positive("obstacles.shape.body_radius", body_radius)?;
            }
        }
        non_negative("obstacles.speed", self.obstacles.speed)?;
        non_negative("obstacles.restitution", self.obstacles.restitution)?;
        positive("obstacles.density", self.obstacles.density)?;
        if let Some(lifetime) = self.obstacles.lifetime {
            if !(lifetime.is_finite() && lifetime > 0.0) {
                return Err(ArcadeError::invalid(
                    "obstacles.lifetime",
                    format!("must be a positive number of seconds, got {lifetime}"),
                ));
            }
        }
        if self.obstacles.max_active == Some(0) {
            return Err(ArcadeError::invalid(
                "obstacles.max_active",
                "must allow at least one obstacle",
            ));
        }

        if !(self.spawn.interval.is_finite() && self.spawn.interval > 0.0) {
            return Err(ArcadeError::invalid(
                "spawn.interval",
                format!("must be a positive number of seconds, got {}", self.spawn.interval),
            ));
        }
        self.spawn.position.validate()?;

        if let Some(limit) = self.rules.time_limit {
            if !(limit.is_finite() && limit > 0.0) {
                return Err(ArcadeError::invalid(
                    "rules.time_limit",
                    format!("must be positive, got {limit}"),
                ));
            }
        }

        positive("max_physics_step", self.max_physics_step)?;
        Ok(())
    }

    /// Serialize this config to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize and validate a config from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save this config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| ArcadeError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a config from a file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ArcadeError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

fn finite(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ArcadeError::invalid(field, format!("must be finite, got {value}")))
    }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ArcadeError::invalid(field, format!("must be positive, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ArcadeError::invalid(field, format!("must not be negative, got {value}")))
    }
}

pub(crate) fn fraction(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ArcadeError::invalid(field, format!("must be within 0..=1, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        SceneConfig::edge_spawn().validate().unwrap();
        SceneConfig::top_right().validate().unwrap();
    }

    #[test]
    fn test_default_controls_follow_template() {
        let controls = ForceMapping::default();
        assert_eq!(controls.thrust_for(ScreenSide::Left), Thrust::Up);
        assert_eq!(controls.thrust_for(ScreenSide::Right), Thrust::Down);
        assert_eq!(Thrust::Up.force(5.0), Vec2::new(0.0, 5.0));
        assert_eq!(Thrust::Down.force(5.0), Vec2::new(0.0, -5.0));
    }

    #[test]
    fn test_json_round_trip_keeps_preset() {
        let config = SceneConfig::top_right().with_seed(7);
        let json = config.to_json().unwrap();
        assert_eq!(SceneConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SceneConfig::from_json(r#"{ "spawn": { "interval": 2.5 } }"#).unwrap();
        assert_eq!(config.spawn.interval, 2.5);
        assert_eq!(config.obstacles, ObstacleConfig::default());
        assert_eq!(config.frame, Size::default());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = SceneConfig::edge_spawn();
        config.spawn.interval = 0.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ArcadeError::InvalidConfig {
                field: "spawn.interval",
                ..
            }
        ));
    }

    #[test]
    fn test_bad_frame_rejected() {
        let config = SceneConfig::edge_spawn().with_frame(0.0, 800.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_cap_rejected() {
        let mut config = SceneConfig::edge_spawn();
        config.obstacles.max_active = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = SceneConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ArcadeError::ParseConfig(_)));
    }

    #[test]
    fn test_player_start_and_floor() {
        let config = SceneConfig::edge_spawn().with_frame(400.0, 800.0);
        assert_eq!(config.player_start(), Vec2::new(200.0, 600.0));
        assert_eq!(config.floor_y(), 200.0);
    }
}
