//! Timed obstacle spawning.

use serde::{Deserialize, Serialize};

use crate::config::fraction;
use crate::error::Result;
use crate::math::{Size, Vec2};
use crate::world::Facing;

/// Most spawns a single `advance` may report.
const MAX_CATCH_UP: u32 = 64;

/// Where new obstacles appear.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnPosition {
    /// Left or right screen edge (fair coin) at a fixed fraction of the height.
    RandomEdge { height_fraction: f32 },
    /// Always the same point, given as fractions of the frame size.
    Fixed { x_fraction: f32, y_fraction: f32 },
}

impl SpawnPosition {
    pub fn validate(&self) -> Result<()> {
        match *self {
            SpawnPosition::RandomEdge { height_fraction } => {
                fraction("spawn.position.height_fraction", height_fraction)
            }
            SpawnPosition::Fixed {
                x_fraction,
                y_fraction,
            } => {
                fraction("spawn.position.x_fraction", x_fraction)?;
                fraction("spawn.position.y_fraction", y_fraction)
            }
        }
    }
}

/// Initial horizontal velocity for an obstacle spawned at `position`: toward
/// the opposite half of the screen.
pub fn launch_velocity(position: Vec2, frame: Size, speed: f32) -> Vec2 {
    let vx = if position.x > frame.mid_x() {
        -speed
    } else {
        speed
    };
    Vec2::new(vx, 0.0)
}

/// Placement and launch data for one obstacle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPlan {
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Facing,
}

/// Repeating spawn timer: fires once right away, then every `interval`
/// seconds of scene time.
#[derive(Debug)]
pub struct Spawner {
    interval: f64,
    position: SpawnPosition,
    until_next: f64,
    seed: Option<u64>,
    rng: fastrand::Rng,
}

impl Spawner {
    pub fn new(interval: f64, position: SpawnPosition, seed: Option<u64>) -> Self {
        Self {
            interval,
            position,
            until_next: 0.0,
            seed,
            rng: Self::make_rng(seed),
        }
    }

    fn make_rng(seed: Option<u64>) -> fastrand::Rng {
        match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Seconds until the next spawn fires.
    pub fn until_next(&self) -> f64 {
        self.until_next
    }

    /// Restart the cycle; a seeded spawner replays the same positions.
    pub fn reset(&mut self) {
        self.until_next = 0.0;
        self.rng = Self::make_rng(self.seed);
    }

    /// Advance the timer by `dt` seconds and return how many spawns are due.
    pub fn advance(&mut self, dt: f64) -> u32 {
        if dt.is_finite() && dt > 0.0 {
            self.until_next -= dt;
        }
        let mut due = 0;
        while self.until_next <= 0.0 && due < MAX_CATCH_UP {
            due += 1;
            self.until_next += self.interval;
        }
        if self.until_next <= 0.0 {
            // Dropped the backlog after a huge hitch.
            self.until_next = self.interval;
        }
        due
    }

    /// Pick a spawn point inside `frame`.
    pub fn pick_position(&mut self, frame: Size) -> Vec2 {
        match self.position {
            SpawnPosition::RandomEdge { height_fraction } => {
                let x = if self.rng.bool() { frame.width } else { 0.0 };
                Vec2::new(x, frame.height * height_fraction)
            }
            SpawnPosition::Fixed {
                x_fraction,
                y_fraction,
            } => Vec2::new(frame.width * x_fraction, frame.height * y_fraction),
        }
    }

    /// Full plan for the next obstacle.
    pub fn plan(&mut self, frame: Size, speed: f32) -> SpawnPlan {
        let position = self.pick_position(frame);
        let velocity = launch_velocity(position, frame, speed);
        SpawnPlan {
            position,
            velocity,
            facing: Facing::from_velocity_x(velocity.x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Size = Size {
        width: 400.0,
        height: 800.0,
    };

    fn edge() -> SpawnPosition {
        SpawnPosition::RandomEdge {
            height_fraction: 0.275,
        }
    }

    #[test]
    fn test_right_edge_moves_left() {
        let v = launch_velocity(Vec2::new(400.0, 220.0), FRAME, 200.0);
        assert_eq!(v, Vec2::new(-200.0, 0.0));
        assert_eq!(Facing::from_velocity_x(v.x), Facing::Left);
    }

    #[test]
    fn test_left_edge_moves_right() {
        let v = launch_velocity(Vec2::new(0.0, 220.0), FRAME, 200.0);
        assert_eq!(v, Vec2::new(200.0, 0.0));
        assert_eq!(Facing::from_velocity_x(v.x), Facing::Right);
    }

    #[test]
    fn test_fires_immediately_then_every_interval() {
        let mut spawner = Spawner::new(1.0, edge(), Some(1));
        assert_eq!(spawner.advance(0.0), 1);
        assert_eq!(spawner.advance(0.5), 0);
        assert_eq!(spawner.advance(0.5), 1);
        assert_eq!(spawner.advance(0.25), 0);
    }

    #[test]
    fn test_long_frame_catches_up() {
        let mut spawner = Spawner::new(1.0, edge(), Some(1));
        spawner.advance(0.0);
        assert_eq!(spawner.advance(3.0), 3);
    }

    #[test]
    fn test_negative_dt_does_not_rewind() {
        let mut spawner = Spawner::new(1.0, edge(), Some(1));
        spawner.advance(0.0);
        assert_eq!(spawner.advance(-5.0), 0);
        assert_eq!(spawner.until_next(), 1.0);
    }

    #[test]
    fn test_random_edge_positions() {
        let mut spawner = Spawner::new(1.0, edge(), Some(42));
        for _ in 0..32 {
            let p = spawner.pick_position(FRAME);
            assert!(p.x == 0.0 || p.x == FRAME.width);
            assert_eq!(p.y, 220.0);
        }
    }

    #[test]
    fn test_seeded_spawner_replays_after_reset() {
        let mut spawner = Spawner::new(1.0, edge(), Some(9));
        let first: Vec<Vec2> = (0..8).map(|_| spawner.pick_position(FRAME)).collect();
        spawner.reset();
        let second: Vec<Vec2> = (0..8).map(|_| spawner.pick_position(FRAME)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fixed_plan_near_top_right() {
        let position = SpawnPosition::Fixed {
            x_fraction: 0.9,
            y_fraction: 0.9,
        };
        let mut spawner = Spawner::new(3.0, position, None);
        let plan = spawner.plan(FRAME, 150.0);
        assert_eq!(plan.position, Vec2::new(360.0, 720.0));
        assert_eq!(plan.velocity, Vec2::new(-150.0, 0.0));
        assert_eq!(plan.facing, Facing::Left);
    }

    #[test]
    fn test_bad_fraction_rejected() {
        let position = SpawnPosition::Fixed {
            x_fraction: 1.5,
            y_fraction: 0.5,
        };
        assert!(position.validate().is_err());
    }
}
