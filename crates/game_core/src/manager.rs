//! The world registry: entity creation, destruction, and typed queries.
//!
//! One [`EntityManager`] exists per world. It is an explicit context object
//! constructed and owned by the tick scheduler and passed by reference —
//! never a global singleton — so multiple worlds can run side by side in
//! tests.

use std::collections::HashMap;

use tracing::debug;

use crate::component::{Component, ComponentKind};
use crate::entity::{Entity, EntityAllocator, EntityId};
use crate::event::{EventSystem, GameEvent};

/// Registry of live entities for one world.
#[derive(Debug, Default)]
pub struct EntityManager {
    allocator: EntityAllocator,
    entities: HashMap<EntityId, Entity>,
}

impl EntityManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            entities: HashMap::new(),
        }
    }

    /// Allocate the next id and register an entity with no components.
    pub fn create_entity(&mut self) -> EntityId {
        let id = self.allocator.allocate();
        self.entities.insert(id, Entity::new(id));
        id
    }

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    #[must_use]
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    #[must_use]
    pub fn entity_exists(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Attach a component, replacing any existing one of the same kind
    /// (overwrite is intentional — e.g. hot-swapping a respawn point). For
    /// network-visible kinds the component is flagged dirty and a
    /// `ComponentAdded` event is enqueued.
    ///
    /// Returns `false` (a logged no-op) when the entity does not exist.
    pub fn add_component(
        &mut self,
        id: EntityId,
        mut component: Component,
        events: &mut EventSystem,
    ) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            debug!(entity = %id, kind = %component.kind(), "add_component on unknown entity");
            return false;
        };
        let kind = component.kind();
        if kind.is_network() {
            component.mark_dirty();
            events.add_event(GameEvent::ComponentAdded { entity: id, kind });
        }
        entity.insert(component);
        true
    }

    #[must_use]
    pub fn get_component(&self, id: EntityId, kind: ComponentKind) -> Option<&Component> {
        self.entities.get(&id).and_then(|e| e.get(kind))
    }

    #[must_use]
    pub fn get_component_mut(
        &mut self,
        id: EntityId,
        kind: ComponentKind,
    ) -> Option<&mut Component> {
        self.entities.get_mut(&id).and_then(|e| e.get_mut(kind))
    }

    /// Capability query against a live entity.
    #[must_use]
    pub fn has_component(&self, id: EntityId, kind: ComponentKind) -> bool {
        self.entities.get(&id).is_some_and(|e| e.has(kind))
    }

    /// Detach a component, enqueueing `ComponentRemoved` for network-visible
    /// kinds. Idempotent: absent component (or entity) is a no-op.
    pub fn remove_component(
        &mut self,
        id: EntityId,
        kind: ComponentKind,
        events: &mut EventSystem,
    ) -> Option<Component> {
        let entity = self.entities.get_mut(&id)?;
        let removed = entity.remove(kind)?;
        if kind.is_network() {
            events.add_event(GameEvent::ComponentRemoved { entity: id, kind });
        }
        Some(removed)
    }

    /// Destroy an entity: remove every component (emitting removal events
    /// for network-visible kinds, in stable kind order), emit
    /// `EntityDestroyed`, then deregister.
    ///
    /// A second call on an already-destroyed id is a logged no-op — stale
    /// references from delayed callbacks are expected and never fatal.
    pub fn destroy_entity(&mut self, id: EntityId, events: &mut EventSystem) -> bool {
        let Some(mut entity) = self.entities.remove(&id) else {
            debug!(entity = %id, "destroy_entity on unknown entity, ignoring");
            return false;
        };
        for kind in entity.kinds() {
            entity.remove(kind);
            if kind.is_network() {
                events.add_event(GameEvent::ComponentRemoved { entity: id, kind });
            }
        }
        events.add_event(GameEvent::EntityDestroyed { entity: id });
        true
    }

    /// Snapshot of all live entity ids. The snapshot does not reflect
    /// mutation that happens after it is taken.
    #[must_use]
    pub fn all_entities(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// All live entities carrying a component of `kind`.
    #[must_use]
    pub fn entities_with(&self, kind: ComponentKind) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.has(kind))
            .map(Entity::id)
            .collect()
    }

    /// Any one live entity carrying a component of `kind`, or `None`.
    #[must_use]
    pub fn first_entity_with(&self, kind: ComponentKind) -> Option<EntityId> {
        self.entities.values().find(|e| e.has(kind)).map(Entity::id)
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Iterate over live entities.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Iterate mutably over live entities.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }
}
