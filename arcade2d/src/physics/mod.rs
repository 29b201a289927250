//! Physics seam between the game loop and the host physics engine.
//!
//! The scene never talks to an engine directly; it goes through
//! [`PhysicsBackend`]. [`RapierBackend`] is the production implementation and
//! [`ScriptedPhysics`] is a deterministic stand-in for tests and tools.

mod rapier;
mod scripted;

use std::ops::{BitAnd, BitOr};

use serde::{Deserialize, Serialize};

use crate::error::{ArcadeError, Result};
use crate::math::Vec2;
use crate::world::EntityId;

pub use rapier::RapierBackend;
pub use scripted::ScriptedPhysics;

/// Collision category bit flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category(u32);

impl Category {
    pub const NONE: Self = Self(0);
    pub const PLAYER: Self = Self(0b1);
    pub const OBSTACLE: Self = Self(0b10);
    pub const FLOOR: Self = Self(0b100);
    pub const ALL: Self = Self(u32::MAX);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Category {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for Category {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// Engine-facing rigid body type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Dynamic,
    Fixed,
}

/// Engine-facing collider shape.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BodyShape {
    Circle { radius: f32 },
    Rect { width: f32, height: f32 },
}

impl BodyShape {
    /// Reject degenerate shapes before they reach an engine.
    pub fn validate(&self) -> Result<()> {
        let ok = match *self {
            BodyShape::Circle { radius } => radius.is_finite() && radius > 0.0,
            BodyShape::Rect { width, height } => {
                width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0
            }
        };
        if ok {
            Ok(())
        } else {
            Err(ArcadeError::invalid("shape", format!("{self:?} must have positive extents")))
        }
    }
}

/// Everything a backend needs to create a body for a scene node.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub shape: BodyShape,
    pub affected_by_gravity: bool,
    pub lock_rotation: bool,
    pub category: Category,
    /// Categories that produce contact-begin events with this body.
    pub contact_mask: Category,
    /// Categories this body physically collides with.
    pub collision_mask: Category,
    pub restitution: f32,
    pub density: f32,
}

impl BodyDesc {
    pub fn dynamic(position: Vec2, shape: BodyShape) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            position,
            velocity: Vec2::ZERO,
            shape,
            affected_by_gravity: true,
            lock_rotation: false,
            category: Category::NONE,
            contact_mask: Category::NONE,
            collision_mask: Category::NONE,
            restitution: 0.2,
            density: 1.0,
        }
    }

    pub fn fixed(position: Vec2, shape: BodyShape) -> Self {
        Self {
            kind: BodyKind::Fixed,
            ..Self::dynamic(position, shape)
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_contact_mask(mut self, mask: Category) -> Self {
        self.contact_mask = mask;
        self
    }

    pub fn with_collision_mask(mut self, mask: Category) -> Self {
        self.collision_mask = mask;
        self
    }

    pub fn with_gravity(mut self, affected: bool) -> Self {
        self.affected_by_gravity = affected;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_locked_rotation(mut self) -> Self {
        self.lock_rotation = true;
        self
    }
}

/// Two bodies started touching during the last step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactEvent {
    pub a: EntityId,
    pub b: EntityId,
}

/// Operations the game loop consumes from the host physics engine.
///
/// Per-entity calls on an entity without a body are silent no-ops, matching
/// how a scene graph treats removed nodes.
pub trait PhysicsBackend {
    fn set_gravity(&mut self, gravity: Vec2);

    fn gravity(&self) -> Vec2;

    /// Create (or replace) the body for `entity`.
    fn create_body(&mut self, entity: EntityId, desc: &BodyDesc) -> Result<()>;

    /// Remove the body of `entity`. Returns whether one existed.
    fn remove_body(&mut self, entity: EntityId) -> bool;

    fn has_body(&self, entity: EntityId) -> bool;

    /// Apply a force for the next step only.
    fn apply_force(&mut self, entity: EntityId, force: Vec2);

    fn set_linear_velocity(&mut self, entity: EntityId, velocity: Vec2);

    fn linear_velocity(&self, entity: EntityId) -> Option<Vec2>;

    fn body_position(&self, entity: EntityId) -> Option<Vec2>;

    fn set_body_position(&mut self, entity: EntityId, position: Vec2);

    /// Advance the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);

    /// Contact-begin events collected since the last drain.
    fn drain_contacts(&mut self) -> Vec<ContactEvent>;
}
