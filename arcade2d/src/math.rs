//! Geometry helpers shared by the scene, the spawner and the backends.
//!
//! Scene coordinates are y-up with the origin at the bottom-left corner of
//! the visible frame, in points.

use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Size of the visible frame in points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Horizontal midpoint of the frame.
    pub fn mid_x(&self) -> f32 {
        self.width * 0.5
    }

    /// Vertical midpoint of the frame.
    pub fn mid_y(&self) -> f32 {
        self.height * 0.5
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

impl Default for Size {
    fn default() -> Self {
        // Portrait phone-sized frame.
        Self {
            width: 430.0,
            height: 932.0,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box of the given size centered on `center`.
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Returns true if the box lies completely outside `[0, width] x [0, height]`
    /// on at least one side. Touching an edge still counts as visible.
    pub fn is_outside_frame(&self, frame: Size) -> bool {
        self.max.x < 0.0
            || self.min.x > frame.width
            || self.max.y < 0.0
            || self.min.y > frame.height
    }
}
