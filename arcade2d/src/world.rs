use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::{Rect, Vec2};
use crate::physics::Category;

/// Unique identifier for a node in the scene graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Get the underlying integer ID (useful for debugging or serialization).
    pub fn to_u32(self) -> u32 {
        self.0
    }
}

/// Name tag of a node. Contact handling identifies bodies by tag, not by
/// category alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeTag {
    Player,
    Obstacle,
    Floor,
}

impl NodeTag {
    pub fn name(self) -> &'static str {
        match self {
            NodeTag::Player => "player",
            NodeTag::Obstacle => "asteroid",
            NodeTag::Floor => "floor",
        }
    }
}

/// Horizontal render orientation of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    /// Facing for a body travelling with horizontal velocity `vx`.
    pub fn from_velocity_x(vx: f32) -> Self {
        if vx > 0.0 {
            Facing::Right
        } else {
            Facing::Left
        }
    }

    /// Horizontal scale to apply to the sprite (mirrors when moving left).
    pub fn x_scale(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }
}

/// A node in the active scene. Position and velocity live in the physics
/// backend; the node carries what the game logic needs on top of that.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub tag: NodeTag,
    pub category: Category,
    /// Visual size used for bounds checks.
    pub size: Vec2,
    pub facing: Facing,
}

impl Node {
    pub fn new(tag: NodeTag, category: Category, size: Vec2) -> Self {
        Self {
            tag,
            category,
            size,
            facing: Facing::default(),
        }
    }

    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    /// Bounding box of the node when centered on `position`.
    pub fn bounds_at(&self, position: Vec2) -> Rect {
        Rect::from_center_size(position, self.size)
    }
}

/// The active scene graph.
///
/// Iteration is in ascending `EntityId` order so frame processing is
/// reproducible.
#[derive(Debug)]
pub struct World {
    next_id: u32,
    nodes: BTreeMap<EntityId, Node>,
}

impl World {
    /// Create a new, empty world.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            nodes: BTreeMap::new(),
        }
    }

    /// Insert a node and return its `EntityId`.
    pub fn spawn(&mut self, node: Node) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node. Removing a node that is already gone returns `None`.
    pub fn despawn(&mut self, entity: EntityId) -> Option<Node> {
        self.nodes.remove(&entity)
    }

    /// Check if an entity is currently in the scene.
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.nodes.contains_key(&entity)
    }

    pub fn get(&self, entity: EntityId) -> Option<&Node> {
        self.nodes.get(&entity)
    }

    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut Node> {
        self.nodes.get_mut(&entity)
    }

    /// Number of nodes in the scene.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Node)> {
        self.nodes.iter().map(|(&id, node)| (id, node))
    }

    /// Snapshot of the ids carrying `tag`, safe to hold while mutating the world.
    pub fn tagged(&self, tag: NodeTag) -> Vec<EntityId> {
        self.iter()
            .filter(|(_, node)| node.tag == tag)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn count_tagged(&self, tag: NodeTag) -> usize {
        self.nodes.values().filter(|node| node.tag == tag).count()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obstacle() -> Node {
        Node::new(NodeTag::Obstacle, Category::OBSTACLE, Vec2::splat(70.0))
    }

    #[test]
    fn test_spawn_assigns_increasing_ids() {
        let mut world = World::new();
        let a = world.spawn(obstacle());
        let b = world.spawn(obstacle());
        assert!(a < b);
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn test_despawn_is_idempotent() {
        let mut world = World::new();
        let a = world.spawn(obstacle());
        assert!(world.despawn(a).is_some());
        assert!(world.despawn(a).is_none());
        assert!(!world.is_alive(a));
        assert!(world.is_empty());
    }

    #[test]
    fn test_tagged_filters_by_tag() {
        let mut world = World::new();
        let floor = world.spawn(Node::new(NodeTag::Floor, Category::FLOOR, Vec2::new(400.0, 1.0)));
        let a = world.spawn(obstacle());
        let b = world.spawn(obstacle());
        assert_eq!(world.tagged(NodeTag::Obstacle), vec![a, b]);
        assert_eq!(world.tagged(NodeTag::Floor), vec![floor]);
        assert_eq!(world.count_tagged(NodeTag::Player), 0);
    }

    #[test]
    fn test_facing_follows_velocity() {
        assert_eq!(Facing::from_velocity_x(200.0), Facing::Right);
        assert_eq!(Facing::from_velocity_x(-200.0), Facing::Left);
        assert_eq!(Facing::Left.x_scale(), -1.0);
        assert_eq!(Facing::Right.x_scale(), 1.0);
    }
}
