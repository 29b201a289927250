// arcade2d/src/physics/rapier.rs
use std::collections::HashMap;

use crate::error::Result;
use crate::math::Vec2;
use crate::physics::{BodyDesc, BodyKind, BodyShape, Category, ContactEvent, PhysicsBackend};
use crate::world::EntityId;

// Rapier is a private implementation detail: do NOT re-export it.
use rapier2d::prelude::*;

/// [`PhysicsBackend`] backed by rapier2d.
pub struct RapierBackend {
    // --- rapier internals ---
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    rigid_bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,

    // Event channels
    event_recv_collision: crossbeam_channel::Receiver<CollisionEvent>,
    event_recv_contact_force: crossbeam_channel::Receiver<ContactForceEvent>,
    event_handler: ChannelEventCollector,

    // --- mappings (scene <-> rapier) ---
    entity_to_body: HashMap<EntityId, RigidBodyHandle>,
    body_to_entity: HashMap<RigidBodyHandle, EntityId>,

    gravity: Vec2,
    pending_contacts: Vec<ContactEvent>,
}

impl Default for RapierBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RapierBackend {
    pub fn new() -> Self {
        let (send_col, recv_col) = crossbeam_channel::unbounded();
        let (send_force, recv_force) = crossbeam_channel::unbounded();
        let event_handler = ChannelEventCollector::new(send_col, send_force);

        Self {
            pipeline: PhysicsPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),

            event_recv_collision: recv_col,
            event_recv_contact_force: recv_force,
            event_handler,

            entity_to_body: HashMap::new(),
            body_to_entity: HashMap::new(),

            gravity: Vec2::ZERO,
            pending_contacts: Vec::new(),
        }
    }

    pub fn with_gravity(gravity: Vec2) -> Self {
        let mut backend = Self::new();
        backend.gravity = gravity;
        backend
    }

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.entity_to_body.len()
    }

    fn body_mut(&mut self, entity: EntityId) -> Option<&mut RigidBody> {
        let handle = self.entity_to_body.get(&entity).copied()?;
        self.rigid_bodies.get_mut(handle)
    }

    fn body(&self, entity: EntityId) -> Option<&RigidBody> {
        let handle = self.entity_to_body.get(&entity).copied()?;
        self.rigid_bodies.get(handle)
    }

    fn to_rapier_shape(shape: BodyShape) -> SharedShape {
        match shape {
            BodyShape::Circle { radius } => SharedShape::ball(radius),
            BodyShape::Rect { width, height } => SharedShape::cuboid(width * 0.5, height * 0.5),
        }
    }

    /// Contact-begin events are what the scene cares about. Solid contacts
    /// only exist between bodies whose groups accept each other, so contact
    /// and collision masks are merged into the collision filter and the
    /// collision mask alone drives the solver.
    fn interaction_groups(desc: &BodyDesc) -> (InteractionGroups, InteractionGroups) {
        let membership = desc.category.bits();
        let collision = InteractionGroups::new(
            membership,
            (desc.contact_mask | desc.collision_mask).bits(),
        );
        let solver = InteractionGroups::new(membership, desc.collision_mask.bits());
        (collision, solver)
    }

    fn collect_events(&mut self) {
        while let Ok(ev) = self.event_recv_collision.try_recv() {
            if let CollisionEvent::Started(c1, c2, _) = ev {
                if let Some((a, b)) = self.map_pair(c1, c2) {
                    self.pending_contacts.push(ContactEvent { a, b });
                }
            }
        }

        // Force events are not used by the game logic; keep the channel empty.
        while self.event_recv_contact_force.try_recv().is_ok() {}
    }

    fn map_pair(&self, c1: ColliderHandle, c2: ColliderHandle) -> Option<(EntityId, EntityId)> {
        let b1 = self.colliders.get(c1)?.parent()?;
        let b2 = self.colliders.get(c2)?.parent()?;
        let e1 = *self.body_to_entity.get(&b1)?;
        let e2 = *self.body_to_entity.get(&b2)?;
        Some((e1, e2))
    }
}

impl PhysicsBackend for RapierBackend {
    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn create_body(&mut self, entity: EntityId, desc: &BodyDesc) -> Result<()> {
        desc.shape.validate()?;

        // One body per entity.
        self.remove_body(entity);

        let rb_type = match desc.kind {
            BodyKind::Dynamic => RigidBodyType::Dynamic,
            BodyKind::Fixed => RigidBodyType::Fixed,
        };

        let mut builder = RigidBodyBuilder::new(rb_type)
            .translation(vector![desc.position.x, desc.position.y])
            .linvel(vector![desc.velocity.x, desc.velocity.y])
            .gravity_scale(if desc.affected_by_gravity { 1.0 } else { 0.0 });

        if desc.lock_rotation {
            builder = builder.lock_rotations();
        }

        // CCD keeps fast obstacles from tunneling through the thin floor.
        if desc.kind == BodyKind::Dynamic {
            builder = builder.ccd_enabled(true);
        }

        let handle = self.rigid_bodies.insert(builder.build());

        let (collision_groups, solver_groups) = Self::interaction_groups(desc);
        let mut collider = ColliderBuilder::new(Self::to_rapier_shape(desc.shape))
            .density(desc.density)
            .restitution(desc.restitution)
            .collision_groups(collision_groups)
            .solver_groups(solver_groups);

        if desc.contact_mask != Category::NONE {
            collider = collider.active_events(ActiveEvents::COLLISION_EVENTS);
        }

        self.colliders
            .insert_with_parent(collider.build(), handle, &mut self.rigid_bodies);

        self.entity_to_body.insert(entity, handle);
        self.body_to_entity.insert(handle, entity);
        Ok(())
    }

    fn remove_body(&mut self, entity: EntityId) -> bool {
        if let Some(handle) = self.entity_to_body.remove(&entity) {
            self.rigid_bodies.remove(
                handle,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
            self.body_to_entity.remove(&handle);
            true
        } else {
            false
        }
    }

    fn has_body(&self, entity: EntityId) -> bool {
        self.entity_to_body.contains_key(&entity)
    }

    fn apply_force(&mut self, entity: EntityId, force: Vec2) {
        if let Some(b) = self.body_mut(entity) {
            b.add_force(vector![force.x, force.y], true);
        }
    }

    fn set_linear_velocity(&mut self, entity: EntityId, velocity: Vec2) {
        if let Some(b) = self.body_mut(entity) {
            b.set_linvel(vector![velocity.x, velocity.y], true);
        }
    }

    fn linear_velocity(&self, entity: EntityId) -> Option<Vec2> {
        let v = self.body(entity)?.linvel();
        Some(Vec2::new(v.x, v.y))
    }

    fn body_position(&self, entity: EntityId) -> Option<Vec2> {
        let t = self.body(entity)?.translation();
        Some(Vec2::new(t.x, t.y))
    }

    fn set_body_position(&mut self, entity: EntityId, position: Vec2) {
        if let Some(b) = self.body_mut(entity) {
            b.set_translation(vector![position.x, position.y], true);
        }
    }

    fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.integration_parameters.dt = dt;

        let gravity = vector![self.gravity.x, self.gravity.y];
        let hooks = &();

        self.pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            hooks,
            &self.event_handler,
        );

        // Rapier keeps user forces until reset; ours last a single step.
        for (_, body) in self.rigid_bodies.iter_mut() {
            body.reset_forces(false);
        }

        self.collect_events();
    }

    fn drain_contacts(&mut self) -> Vec<ContactEvent> {
        std::mem::take(&mut self.pending_contacts)
    }
}
