//! The arcade scene: player, floor, obstacles and the per-frame loop.
//!
//! A host calls [`ArcadeScene::did_move`] once, forwards pointer events to
//! [`ArcadeScene::touch_began`] / [`ArcadeScene::touch_ended`], and calls
//! [`ArcadeScene::tick`] once per rendered frame with the frame timestamp.
//! Everything runs on the caller's thread.

use crate::collision::{resolve_contact, ContactOutcome};
use crate::config::SceneConfig;
use crate::error::{ArcadeError, Result};
use crate::input::{ScreenSide, TouchInput};
use crate::math::Vec2;
use crate::physics::{BodyDesc, BodyShape, Category, ContactEvent, PhysicsBackend};
use crate::session::{FrameClock, SessionState, SessionSummary};
use crate::spawner::Spawner;
use crate::world::{EntityId, Facing, Node, NodeTag, World};

/// Physics steps allowed per frame before the remainder is dropped.
const MAX_SUBSTEPS: u32 = 8;

/// Counters for a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Obstacles removed for leaving the frame.
    pub culled: u32,
    pub spawned: u32,
    /// Spawns dropped because the obstacle cap was reached.
    pub skipped: u32,
    /// Obstacles removed by their lifetime timer.
    pub expired: u32,
    /// Obstacles removed by touching the player.
    pub hits: u32,
}

/// Render-facing snapshot of one obstacle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstacleView {
    pub id: EntityId,
    pub position: Vec2,
    pub size: Vec2,
    pub facing: Facing,
}

#[derive(Clone, Copy, Debug)]
struct Expiry {
    entity: EntityId,
    at: f64,
}

pub struct ArcadeScene<P: PhysicsBackend> {
    config: SceneConfig,
    physics: P,
    world: World,
    session: SessionState,
    clock: FrameClock,
    input: TouchInput,
    spawner: Spawner,
    expirations: Vec<Expiry>,
    player: Option<EntityId>,
    floor: Option<EntityId>,
    /// Time the scene's actions have run for; unlike session time it keeps
    /// no record of game over.
    scene_time: f64,
    /// Player force resolved by the last `update`, applied on each substep.
    thrust: Vec2,
    stats: FrameStats,
}

impl<P: PhysicsBackend> ArcadeScene<P> {
    /// Validate `config` and build an empty scene on top of `physics`.
    pub fn new(config: SceneConfig, physics: P) -> Result<Self> {
        config.validate()?;
        let spawner = Spawner::new(
            config.spawn.interval,
            config.spawn.position,
            config.spawn.seed,
        );
        Ok(Self {
            session: SessionState::new(config.rules),
            config,
            physics,
            world: World::new(),
            clock: FrameClock::new(),
            input: TouchInput::new(),
            spawner,
            expirations: Vec::new(),
            player: None,
            floor: None,
            scene_time: 0.0,
            thrust: Vec2::ZERO,
            stats: FrameStats::default(),
        })
    }

    /// Populate the scene. Calling it again on a set-up scene does nothing.
    pub fn did_move(&mut self) -> Result<()> {
        if self.player.is_some() {
            log::warn!("did_move called on a scene that is already set up");
            return Ok(());
        }
        self.set_up_game()?;
        self.set_up_physics_world();
        if let Err(err) = self.create_floor() {
            self.remove_player();
            return Err(err);
        }
        log::info!(
            "Scene set up: {}x{} frame, spawning every {}s",
            self.config.frame.width,
            self.config.frame.height,
            self.config.spawn.interval
        );
        Ok(())
    }

    fn set_up_game(&mut self) -> Result<()> {
        self.session.set_up_game();
        self.create_player()?;
        self.spawner.reset();
        Ok(())
    }

    fn set_up_physics_world(&mut self) {
        self.physics.set_gravity(self.config.gravity);
    }

    fn player_desc(&self) -> BodyDesc {
        let player = &self.config.player;
        BodyDesc::dynamic(
            self.config.player_start(),
            BodyShape::Circle {
                radius: player.body_radius,
            },
        )
        .with_gravity(false)
        .with_locked_rotation()
        .with_density(player.density)
        .with_category(Category::PLAYER)
        .with_contact_mask(Category::OBSTACLE)
        .with_collision_mask(Category::OBSTACLE)
    }

    fn create_player(&mut self) -> Result<()> {
        let size = Vec2::splat(self.config.player.radius * 2.0);
        let id = self
            .world
            .spawn(Node::new(NodeTag::Player, Category::PLAYER, size));
        let desc = self.player_desc();
        if let Err(err) = self.physics.create_body(id, &desc) {
            self.world.despawn(id);
            return Err(err);
        }
        self.player = Some(id);
        Ok(())
    }

    fn remove_player(&mut self) {
        if let Some(id) = self.player.take() {
            self.physics.remove_body(id);
            self.world.despawn(id);
        }
    }

    fn create_floor(&mut self) -> Result<()> {
        let frame = self.config.frame;
        let floor = &self.config.floor;
        let size = Vec2::new(frame.width, floor.thickness);
        let id = self
            .world
            .spawn(Node::new(NodeTag::Floor, Category::FLOOR, size));
        let desc = BodyDesc::fixed(
            Vec2::new(frame.mid_x(), self.config.floor_y()),
            BodyShape::Rect {
                width: size.x,
                height: size.y,
            },
        )
        .with_restitution(floor.restitution)
        .with_category(Category::FLOOR)
        .with_contact_mask(Category::OBSTACLE)
        .with_collision_mask(Category::OBSTACLE);
        if let Err(err) = self.physics.create_body(id, &desc) {
            self.world.despawn(id);
            return Err(err);
        }
        self.floor = Some(id);
        Ok(())
    }

    /// The per-frame update. Returns the time since the previous frame.
    ///
    /// Culls obstacles that left the frame, sets the player's thrust from the
    /// held sides, finishes the session if it is over and feeds the session
    /// clock. The thrust acts on every physics step of this frame and on no
    /// other; a frame without steps pushes nothing.
    pub fn update(&mut self, current_time: f64) -> f64 {
        self.stats = FrameStats::default();

        self.cull_offscreen_obstacles();
        self.thrust = self.held_thrust();

        if self.session.is_game_over() {
            self.finish_game();
        }

        let delta = self.clock.advance(current_time);
        self.session.add_session_time(delta);
        delta
    }

    /// Run a whole frame the way a host engine does: update, timed actions,
    /// physics, contact callbacks, then constraints. Actions and physics stay
    /// frozen once the session is over.
    pub fn tick(&mut self, current_time: f64) -> Result<FrameStats> {
        if self.player.is_none() {
            return Err(ArcadeError::NotSetUp);
        }

        let delta = self.update(current_time);
        if self.session.is_game_over() {
            return Ok(self.stats);
        }

        self.scene_time += delta;
        self.run_actions(delta)?;
        self.simulate(delta);
        Ok(self.stats)
    }

    fn cull_offscreen_obstacles(&mut self) {
        let frame = self.config.frame;
        for id in self.world.tagged(NodeTag::Obstacle) {
            let offscreen = match (self.world.get(id), self.physics.body_position(id)) {
                (Some(node), Some(position)) => node.bounds_at(position).is_outside_frame(frame),
                _ => false,
            };
            if offscreen && self.remove_obstacle(id) {
                self.session.record_dodge();
                self.stats.culled += 1;
            }
        }
    }

    fn held_thrust(&self) -> Vec2 {
        let magnitude = self.config.player.thrust;
        self.input
            .held_sides()
            .map(|side| self.config.controls.thrust_for(side).force(magnitude))
            .sum()
    }

    /// Force on the player for the current frame.
    pub fn thrust(&self) -> Vec2 {
        self.thrust
    }

    fn push_player(&mut self) {
        let Some(player) = self.player else {
            return;
        };
        if self.thrust != Vec2::ZERO {
            log::trace!("Pushing player {}", self.thrust);
            self.physics.apply_force(player, self.thrust);
        }
    }

    /// Mark the session finished. Idempotent.
    pub fn finish_game(&mut self) {
        self.session.finish_game();
    }

    fn run_actions(&mut self, delta: f64) -> Result<()> {
        for _ in 0..self.spawner.advance(delta) {
            self.spawn_obstacle()?;
        }

        let now = self.scene_time;
        let mut due = Vec::new();
        self.expirations.retain(|expiry| {
            if expiry.at <= now {
                due.push(expiry.entity);
                false
            } else {
                true
            }
        });
        for id in due {
            if self.remove_obstacle(id) {
                self.stats.expired += 1;
            }
        }
        Ok(())
    }

    /// Create one obstacle from the spawner's next plan. Returns `None` when
    /// the active-obstacle cap is reached.
    pub fn spawn_obstacle(&mut self) -> Result<Option<EntityId>> {
        let obstacles = &self.config.obstacles;
        if let Some(max) = obstacles.max_active {
            if self.world.count_tagged(NodeTag::Obstacle) >= max {
                log::debug!("Obstacle cap of {max} reached; skipping spawn");
                self.stats.skipped += 1;
                return Ok(None);
            }
        }

        let plan = self.spawner.plan(self.config.frame, obstacles.speed);
        let node = Node::new(
            NodeTag::Obstacle,
            Category::OBSTACLE,
            obstacles.shape.visual_size(),
        )
        .with_facing(plan.facing);
        let desc = BodyDesc::dynamic(plan.position, obstacles.shape.body_shape())
            .with_velocity(plan.velocity)
            .with_restitution(obstacles.restitution)
            .with_density(obstacles.density)
            .with_category(Category::OBSTACLE)
            .with_contact_mask(Category::PLAYER | Category::FLOOR)
            .with_collision_mask(Category::PLAYER | Category::FLOOR);
        let lifetime = obstacles.lifetime;

        let id = self.world.spawn(node);
        if let Err(err) = self.physics.create_body(id, &desc) {
            self.world.despawn(id);
            return Err(err);
        }
        if let Some(lifetime) = lifetime {
            self.expirations.push(Expiry {
                entity: id,
                at: self.scene_time + lifetime,
            });
        }

        log::debug!(
            "Spawned obstacle {} at ({:.1}, {:.1}) moving {:?}",
            id.to_u32(),
            plan.position.x,
            plan.position.y,
            plan.facing
        );
        self.stats.spawned += 1;
        Ok(Some(id))
    }

    /// Remove an obstacle from the scene and the physics world. Returns
    /// whether it was still present; removing it twice is a no-op.
    pub fn remove_obstacle(&mut self, id: EntityId) -> bool {
        match self.world.get(id) {
            Some(node) if node.tag == NodeTag::Obstacle => {}
            _ => return false,
        }
        self.world.despawn(id);
        self.physics.remove_body(id);
        log::debug!("Removed obstacle {}", id.to_u32());
        true
    }

    fn simulate(&mut self, delta: f64) {
        let max_step = f64::from(self.config.max_physics_step);
        let mut remaining = delta;
        let mut steps = 0;
        while remaining > 0.0 && steps < MAX_SUBSTEPS {
            let dt = remaining.min(max_step);
            self.push_player();
            self.physics.step(dt as f32);
            self.apply_constraints();
            remaining -= dt;
            steps += 1;
        }
        if remaining > 0.0 {
            log::trace!("Dropped {remaining:.4}s of physics time this frame");
        }

        for event in self.physics.drain_contacts() {
            self.handle_contact(event);
        }
    }

    /// React to a contact-begin event. Returns true if an obstacle was removed.
    pub fn handle_contact(&mut self, event: ContactEvent) -> bool {
        match resolve_contact(&self.world, event) {
            ContactOutcome::RemoveObstacle(id) => {
                let removed = self.remove_obstacle(id);
                if removed {
                    self.session.record_hit();
                    self.stats.hits += 1;
                }
                removed
            }
            ContactOutcome::Ignore => false,
        }
    }

    /// Keep the player inside the frame: always horizontally, and vertically
    /// unless `player.clamp_vertical` is off. Velocity along a clamped axis
    /// is zeroed.
    fn apply_constraints(&mut self) {
        let Some(player) = self.player else {
            return;
        };
        let Some(position) = self.physics.body_position(player) else {
            return;
        };
        let frame = self.config.frame;
        let mut clamped = position;
        clamped.x = clamped.x.clamp(0.0, frame.width);
        if self.config.player.clamp_vertical {
            clamped.y = clamped.y.clamp(0.0, frame.height);
        }
        if clamped == position {
            return;
        }

        self.physics.set_body_position(player, clamped);
        if let Some(mut velocity) = self.physics.linear_velocity(player) {
            if clamped.x != position.x {
                velocity.x = 0.0;
            }
            if clamped.y != position.y {
                velocity.y = 0.0;
            }
            self.physics.set_linear_velocity(player, velocity);
        }
    }

    /// Pointer went down at `x` (scene points).
    pub fn touch_began(&mut self, x: f32) -> ScreenSide {
        self.input.touch_began(x, self.config.frame.width)
    }

    /// Any pointer went up.
    pub fn touch_ended(&mut self) {
        self.input.touch_ended();
    }

    /// Start a new session in place: obstacles go, the player returns to its
    /// start point, time and the spawn cycle start over.
    pub fn restart_game(&mut self) -> Result<()> {
        let Some(player) = self.player else {
            return Err(ArcadeError::NotSetUp);
        };

        for id in self.world.tagged(NodeTag::Obstacle) {
            self.remove_obstacle(id);
        }
        self.expirations.clear();

        let desc = self.player_desc();
        self.physics.create_body(player, &desc)?;

        self.session.restart_game();
        self.clock.reset();
        self.spawner.reset();
        self.input.touch_ended();
        self.scene_time = 0.0;
        self.thrust = Vec2::ZERO;
        self.stats = FrameStats::default();
        log::info!("Game restarted");
        Ok(())
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Mutable session access, e.g. for a host that ends the game itself.
    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    pub fn input(&self) -> &TouchInput {
        &self.input
    }

    /// Mutable input access for platform adapters (winit touch/mouse events).
    pub fn input_mut(&mut self) -> &mut TouchInput {
        &mut self.input
    }

    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    pub fn floor(&self) -> Option<EntityId> {
        self.floor
    }

    pub fn player_position(&self) -> Option<Vec2> {
        self.physics.body_position(self.player?)
    }

    pub fn scene_time(&self) -> f64 {
        self.scene_time
    }

    pub fn obstacle_count(&self) -> usize {
        self.world.count_tagged(NodeTag::Obstacle)
    }

    pub fn obstacles(&self) -> Vec<ObstacleView> {
        self.world
            .iter()
            .filter(|(_, node)| node.tag == NodeTag::Obstacle)
            .filter_map(|(id, node)| {
                let position = self.physics.body_position(id)?;
                Some(ObstacleView {
                    id,
                    position,
                    size: node.size,
                    facing: node.facing,
                })
            })
            .collect()
    }

    pub fn summary(&self) -> SessionSummary {
        self.session.summary()
    }
}
