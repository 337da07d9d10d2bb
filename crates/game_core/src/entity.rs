//! Entity identity and the per-entity component map.
//!
//! An [`EntityId`] is a lightweight `u64` identifier. Ids are allocated
//! monotonically and never reused, so a stale id held by a delayed task can
//! never alias a newer entity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentKind};
use crate::components::{
    Chat, ColorTint, Health, Input, Inventory, PhysicsBody, Player, Position, ProximityPrompt,
    Rotation, Score, Size, SpawnPosition, Team, Text,
};

/// A unique entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The null / invalid entity sentinel.
    pub const INVALID: EntityId = EntityId(0);

    /// Create an id from a raw `u64`.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// The raw `u64` identifier.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// `true` for any non-zero id.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Allocates monotonically increasing entity ids. Ids start at 1; 0 is
/// reserved for [`EntityId::INVALID`]. Destroyed ids are never recycled.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Allocate a fresh entity id.
    pub fn allocate(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        EntityId(id)
    }

    /// Number of ids allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id - 1
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// An identity plus its attached components, at most one per kind.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    components: HashMap<ComponentKind, Component>,
}

impl Entity {
    /// Create an entity with no components.
    #[must_use]
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            components: HashMap::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Capability query: does this entity carry a component of `kind`?
    #[must_use]
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.contains_key(&kind)
    }

    #[must_use]
    pub fn get(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.get(&kind)
    }

    #[must_use]
    pub fn get_mut(&mut self, kind: ComponentKind) -> Option<&mut Component> {
        self.components.get_mut(&kind)
    }

    /// Attach a component, replacing any existing one of the same kind.
    /// Returns the replaced component, if any.
    pub fn insert(&mut self, component: Component) -> Option<Component> {
        self.components.insert(component.kind(), component)
    }

    /// Detach the component of `kind`, if present.
    pub fn remove(&mut self, kind: ComponentKind) -> Option<Component> {
        self.components.remove(&kind)
    }

    /// Attached kinds in stable (sorted) order.
    #[must_use]
    pub fn kinds(&self) -> Vec<ComponentKind> {
        let mut kinds: Vec<ComponentKind> = self.components.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Iterate over attached components.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Iterate mutably over attached components.
    pub fn components_mut(&mut self) -> impl Iterator<Item = &mut Component> {
        self.components.values_mut()
    }

    // Typed accessors. The union is closed, so each is a static two-arm
    // match rather than a downcast.

    #[must_use]
    pub fn position(&self) -> Option<&Position> {
        match self.get(ComponentKind::Position) {
            Some(Component::Position(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn position_mut(&mut self) -> Option<&mut Position> {
        match self.get_mut(ComponentKind::Position) {
            Some(Component::Position(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn rotation(&self) -> Option<&Rotation> {
        match self.get(ComponentKind::Rotation) {
            Some(Component::Rotation(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn rotation_mut(&mut self) -> Option<&mut Rotation> {
        match self.get_mut(ComponentKind::Rotation) {
            Some(Component::Rotation(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn color(&self) -> Option<&ColorTint> {
        match self.get(ComponentKind::Color) {
            Some(Component::Color(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn color_mut(&mut self) -> Option<&mut ColorTint> {
        match self.get_mut(ComponentKind::Color) {
            Some(Component::Color(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn player(&self) -> Option<&Player> {
        match self.get(ComponentKind::Player) {
            Some(Component::Player(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn player_mut(&mut self) -> Option<&mut Player> {
        match self.get_mut(ComponentKind::Player) {
            Some(Component::Player(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn text(&self) -> Option<&Text> {
        match self.get(ComponentKind::Text) {
            Some(Component::Text(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn text_mut(&mut self) -> Option<&mut Text> {
        match self.get_mut(ComponentKind::Text) {
            Some(Component::Text(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn chat(&self) -> Option<&Chat> {
        match self.get(ComponentKind::Chat) {
            Some(Component::Chat(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn chat_mut(&mut self) -> Option<&mut Chat> {
        match self.get_mut(ComponentKind::Chat) {
            Some(Component::Chat(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn health(&self) -> Option<&Health> {
        match self.get(ComponentKind::Health) {
            Some(Component::Health(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn health_mut(&mut self) -> Option<&mut Health> {
        match self.get_mut(ComponentKind::Health) {
            Some(Component::Health(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn inventory(&self) -> Option<&Inventory> {
        match self.get(ComponentKind::Inventory) {
            Some(Component::Inventory(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn inventory_mut(&mut self) -> Option<&mut Inventory> {
        match self.get_mut(ComponentKind::Inventory) {
            Some(Component::Inventory(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn score(&self) -> Option<&Score> {
        match self.get(ComponentKind::Score) {
            Some(Component::Score(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn score_mut(&mut self) -> Option<&mut Score> {
        match self.get_mut(ComponentKind::Score) {
            Some(Component::Score(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn team(&self) -> Option<&Team> {
        match self.get(ComponentKind::Team) {
            Some(Component::Team(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn team_mut(&mut self) -> Option<&mut Team> {
        match self.get_mut(ComponentKind::Team) {
            Some(Component::Team(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn proximity_prompt(&self) -> Option<&ProximityPrompt> {
        match self.get(ComponentKind::ProximityPrompt) {
            Some(Component::ProximityPrompt(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn proximity_prompt_mut(&mut self) -> Option<&mut ProximityPrompt> {
        match self.get_mut(ComponentKind::ProximityPrompt) {
            Some(Component::ProximityPrompt(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn size(&self) -> Option<&Size> {
        match self.get(ComponentKind::Size) {
            Some(Component::Size(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn size_mut(&mut self) -> Option<&mut Size> {
        match self.get_mut(ComponentKind::Size) {
            Some(Component::Size(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn input(&self) -> Option<&Input> {
        match self.get(ComponentKind::Input) {
            Some(Component::Input(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn input_mut(&mut self) -> Option<&mut Input> {
        match self.get_mut(ComponentKind::Input) {
            Some(Component::Input(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn physics_body(&self) -> Option<&PhysicsBody> {
        match self.get(ComponentKind::PhysicsBody) {
            Some(Component::PhysicsBody(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn spawn_position(&self) -> Option<&SpawnPosition> {
        match self.get(ComponentKind::SpawnPosition) {
            Some(Component::SpawnPosition(c)) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn spawn_position_mut(&mut self) -> Option<&mut SpawnPosition> {
        match self.get_mut(ComponentKind::SpawnPosition) {
            Some(Component::SpawnPosition(c)) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_invalid_sentinel() {
        assert!(!EntityId::INVALID.is_valid());
        assert!(EntityId::from_raw(42).is_valid());
        assert_eq!(EntityId::from_raw(42).raw(), 42);
    }

    #[test]
    fn test_allocator_is_monotonic() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_eq!(a.raw(), 1);
        assert_eq!(b.raw(), 2);
        assert_eq!(alloc.count(), 2);
    }

    #[test]
    fn test_insert_replaces_same_kind() {
        let mut entity = Entity::new(EntityId(1));
        assert!(entity.insert(Health::new(100, 100).into()).is_none());
        let replaced = entity.insert(Health::new(50, 50).into());
        assert!(replaced.is_some());
        assert_eq!(entity.health().unwrap().max_health, 50);
        assert_eq!(entity.kinds().len(), 1);
    }

    #[test]
    fn test_typed_accessor_miss_is_none() {
        let mut entity = Entity::new(EntityId(1));
        entity.insert(Position::new(0.0, 0.0, 0.0).into());
        assert!(entity.health().is_none());
        assert!(entity.position().is_some());
        assert!(entity.has(ComponentKind::Position));
        assert!(!entity.has(ComponentKind::Health));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut entity = Entity::new(EntityId(1));
        entity.insert(Score::new(0).into());
        assert!(entity.remove(ComponentKind::Score).is_some());
        assert!(entity.remove(ComponentKind::Score).is_none());
    }
}
