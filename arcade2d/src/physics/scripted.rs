use std::collections::BTreeMap;

use crate::error::Result;
use crate::math::Vec2;
use crate::physics::{BodyDesc, BodyKind, BodyShape, ContactEvent, PhysicsBackend};
use crate::world::EntityId;

#[derive(Clone, Debug)]
struct ScriptedBody {
    desc: BodyDesc,
    position: Vec2,
    velocity: Vec2,
    mass: f32,
    force: Vec2,
}

/// Deterministic [`PhysicsBackend`] without collision detection.
///
/// Bodies are integrated with explicit Euler steps. Contacts never happen on
/// their own; callers inject them with [`ScriptedPhysics::push_contact`].
/// Every applied force is recorded so tests can observe what the loop did.
#[derive(Debug, Default)]
pub struct ScriptedPhysics {
    bodies: BTreeMap<EntityId, ScriptedBody>,
    gravity: Vec2,
    contacts: Vec<ContactEvent>,
    force_log: Vec<(EntityId, Vec2)>,
    steps: u32,
}

impl ScriptedPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a contact-begin event for the next drain.
    pub fn push_contact(&mut self, a: EntityId, b: EntityId) {
        self.contacts.push(ContactEvent { a, b });
    }

    /// Forces applied since the last call, in call order.
    pub fn take_force_log(&mut self) -> Vec<(EntityId, Vec2)> {
        std::mem::take(&mut self.force_log)
    }

    /// Description the body was created with.
    pub fn body_desc(&self, entity: EntityId) -> Option<&BodyDesc> {
        self.bodies.get(&entity).map(|b| &b.desc)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of non-empty steps taken so far.
    pub fn steps(&self) -> u32 {
        self.steps
    }
}

fn area(shape: BodyShape) -> f32 {
    match shape {
        BodyShape::Circle { radius } => std::f32::consts::PI * radius * radius,
        BodyShape::Rect { width, height } => width * height,
    }
}

impl PhysicsBackend for ScriptedPhysics {
    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn create_body(&mut self, entity: EntityId, desc: &BodyDesc) -> Result<()> {
        desc.shape.validate()?;
        let mass = (area(desc.shape) * desc.density).max(f32::EPSILON);
        self.bodies.insert(
            entity,
            ScriptedBody {
                desc: desc.clone(),
                position: desc.position,
                velocity: desc.velocity,
                mass,
                force: Vec2::ZERO,
            },
        );
        Ok(())
    }

    fn remove_body(&mut self, entity: EntityId) -> bool {
        self.bodies.remove(&entity).is_some()
    }

    fn has_body(&self, entity: EntityId) -> bool {
        self.bodies.contains_key(&entity)
    }

    fn apply_force(&mut self, entity: EntityId, force: Vec2) {
        if let Some(body) = self.bodies.get_mut(&entity) {
            body.force += force;
            self.force_log.push((entity, force));
        }
    }

    fn set_linear_velocity(&mut self, entity: EntityId, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(&entity) {
            body.velocity = velocity;
        }
    }

    fn linear_velocity(&self, entity: EntityId) -> Option<Vec2> {
        self.bodies.get(&entity).map(|b| b.velocity)
    }

    fn body_position(&self, entity: EntityId) -> Option<Vec2> {
        self.bodies.get(&entity).map(|b| b.position)
    }

    fn set_body_position(&mut self, entity: EntityId, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(&entity) {
            body.position = position;
        }
    }

    fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.steps += 1;

        for body in self.bodies.values_mut() {
            if body.desc.kind == BodyKind::Fixed {
                body.force = Vec2::ZERO;
                continue;
            }
            let mut accel = body.force / body.mass;
            if body.desc.affected_by_gravity {
                accel += self.gravity;
            }
            body.velocity += accel * dt;
            body.position += body.velocity * dt;
            body.force = Vec2::ZERO;
        }
    }

    fn drain_contacts(&mut self) -> Vec<ContactEvent> {
        std::mem::take(&mut self.contacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Node, NodeTag, World};
    use crate::physics::Category;

    fn entity() -> EntityId {
        World::new().spawn(Node::new(NodeTag::Obstacle, Category::OBSTACLE, Vec2::ONE))
    }

    #[test]
    fn test_gravity_only_moves_affected_bodies() {
        let mut physics = ScriptedPhysics::new();
        physics.set_gravity(Vec2::new(0.0, -100.0));

        let e = entity();
        let desc = BodyDesc::dynamic(Vec2::new(0.0, 100.0), BodyShape::Circle { radius: 1.0 })
            .with_gravity(false);
        physics.create_body(e, &desc).unwrap();

        physics.step(0.5);
        assert_eq!(physics.body_position(e), Some(Vec2::new(0.0, 100.0)));
    }

    #[test]
    fn test_force_lasts_one_step() {
        let mut physics = ScriptedPhysics::new();
        let e = entity();
        let desc = BodyDesc::dynamic(Vec2::ZERO, BodyShape::Rect { width: 1.0, height: 1.0 })
            .with_gravity(false);
        physics.create_body(e, &desc).unwrap();

        physics.apply_force(e, Vec2::new(0.0, 10.0));
        physics.step(1.0);
        assert_eq!(physics.linear_velocity(e), Some(Vec2::new(0.0, 10.0)));

        physics.step(1.0);
        assert_eq!(physics.linear_velocity(e), Some(Vec2::new(0.0, 10.0)));
        assert_eq!(physics.take_force_log(), vec![(e, Vec2::new(0.0, 10.0))]);
        assert!(physics.take_force_log().is_empty());
    }

    #[test]
    fn test_calls_on_missing_body_are_noops() {
        let mut physics = ScriptedPhysics::new();
        let e = entity();
        physics.apply_force(e, Vec2::ONE);
        physics.set_linear_velocity(e, Vec2::ONE);
        assert!(!physics.remove_body(e));
        assert!(physics.body_position(e).is_none());
        assert!(physics.take_force_log().is_empty());
    }

    #[test]
    fn test_zero_step_does_not_advance() {
        let mut physics = ScriptedPhysics::new();
        physics.step(0.0);
        assert_eq!(physics.steps(), 0);
    }
}
