//! Contact-begin policy.
//!
//! Only a player touching an obstacle has gameplay meaning: the obstacle is
//! removed. Obstacles bouncing on the floor are the physics engine's
//! business and are ignored here.

use crate::physics::{Category, ContactEvent};
use crate::world::{EntityId, NodeTag, World};

/// What the scene should do about a contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactOutcome {
    /// The player was hit; remove this obstacle.
    RemoveObstacle(EntityId),
    Ignore,
}

/// Decide what a contact between `event.a` and `event.b` means.
///
/// Entities that are no longer in `world` (removed earlier in the same frame,
/// for instance) make the contact a no-op.
pub fn resolve_contact(world: &World, event: ContactEvent) -> ContactOutcome {
    let (Some(a), Some(b)) = (world.get(event.a), world.get(event.b)) else {
        return ContactOutcome::Ignore;
    };

    let player_vs_obstacle = (a.category == Category::PLAYER && b.category == Category::OBSTACLE)
        || (a.category == Category::OBSTACLE && b.category == Category::PLAYER);
    if !player_vs_obstacle {
        return ContactOutcome::Ignore;
    }

    // Pick the member by tag, not by category.
    if a.tag == NodeTag::Obstacle {
        ContactOutcome::RemoveObstacle(event.a)
    } else if b.tag == NodeTag::Obstacle {
        ContactOutcome::RemoveObstacle(event.b)
    } else {
        ContactOutcome::Ignore
    }
}
