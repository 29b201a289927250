//! Arcade2D - game-loop core for a small 2D dodge-the-obstacles scene.
//!
//! A player disc is pushed up or down by holding either half of the screen
//! while obstacles spawn on a timer, fall under gravity and slide across.
//! Obstacles disappear when they leave the frame or touch the player.
//! Physics is reached through [`PhysicsBackend`]; [`RapierBackend`] is the
//! production engine and [`ScriptedPhysics`] a deterministic stand-in.

pub mod collision;
pub mod config;
pub mod error;
pub mod input;
pub mod math;
pub mod physics;
pub mod scene;
pub mod session;
pub mod spawner;
pub mod world;

pub use crate::collision::{resolve_contact, ContactOutcome};
pub use crate::config::{ForceMapping, ObstacleShape, SceneConfig, Thrust};
pub use crate::error::{ArcadeError, Result};
pub use crate::input::{ScreenSide, TouchInput};
pub use crate::math::{Rect, Size, Vec2};
pub use crate::physics::{
    BodyDesc, BodyShape, Category, ContactEvent, PhysicsBackend, RapierBackend, ScriptedPhysics,
};
pub use crate::scene::{ArcadeScene, FrameStats, ObstacleView};
pub use crate::session::{FrameClock, GameOverRules, SessionState, SessionSummary};
pub use crate::spawner::{SpawnPosition, Spawner};
pub use crate::world::{EntityId, Facing, NodeTag, World};
