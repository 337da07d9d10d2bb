//! Tick-scoped event bus.
//!
//! Events are immutable notifications visible only within the tick that
//! produced them. The queue preserves insertion order, supports
//! non-destructive reads by many consumers, and is fully discarded once per
//! tick after consumers run — no backlog, bounded memory.

use serde::{Deserialize, Serialize};

use crate::component::ComponentKind;
use crate::entity::EntityId;

/// Delivery scope of a [`GameEvent::Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageScope {
    /// Chat line shown to everyone.
    GlobalChat,
    /// Banner notification shown to everyone.
    GlobalNotification,
    /// Chat line delivered only to the targeted player entities.
    TargetedChat,
    /// Banner notification delivered only to the targeted player entities.
    TargetedNotification,
}

impl MessageScope {
    /// Whether delivery is restricted to the message's target list.
    #[must_use]
    pub const fn is_targeted(self) -> bool {
        matches!(self, Self::TargetedChat | Self::TargetedNotification)
    }
}

/// Component lifecycle stage, used for wrapped event queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentEventKind {
    Added,
    Removed,
    Updated,
}

/// An immutable, tick-scoped notification.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A network-visible component was attached (or replaced).
    ComponentAdded { entity: EntityId, kind: ComponentKind },
    /// A network-visible component was detached.
    ComponentRemoved { entity: EntityId, kind: ComponentKind },
    /// A component was mutated at an explicit mutation site.
    ComponentUpdated { entity: EntityId, kind: ComponentKind },
    /// An entity was destroyed and deregistered.
    EntityDestroyed { entity: EntityId },
    /// A chat or notification message routed through the chat entity.
    Message {
        /// The chat entity carrying the backlog.
        entity: EntityId,
        author: String,
        content: String,
        scope: MessageScope,
        /// Player entity ids for targeted scopes; empty for global scopes.
        targets: Vec<EntityId>,
    },
    /// Request to retint an entity.
    ColorChange { entity: EntityId, color: String },
    /// A player interacted with a proximity prompt (already validated).
    ProximityInteract { prompt: EntityId, player: EntityId },
    /// A player used an inventory item (already validated as held).
    ItemUsed { entity: EntityId, item_id: String },
    /// Two physics bodies started or stopped touching, keyed by their
    /// entities.
    Collision {
        a: EntityId,
        b: EntityId,
        started: bool,
    },
}

/// Discriminant of [`GameEvent`], for kind-filtered queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ComponentAdded,
    ComponentRemoved,
    ComponentUpdated,
    EntityDestroyed,
    Message,
    ColorChange,
    ProximityInteract,
    ItemUsed,
    Collision,
}

impl GameEvent {
    /// The discriminant of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ComponentAdded { .. } => EventKind::ComponentAdded,
            Self::ComponentRemoved { .. } => EventKind::ComponentRemoved,
            Self::ComponentUpdated { .. } => EventKind::ComponentUpdated,
            Self::EntityDestroyed { .. } => EventKind::EntityDestroyed,
            Self::Message { .. } => EventKind::Message,
            Self::ColorChange { .. } => EventKind::ColorChange,
            Self::ProximityInteract { .. } => EventKind::ProximityInteract,
            Self::ItemUsed { .. } => EventKind::ItemUsed,
            Self::Collision { .. } => EventKind::Collision,
        }
    }
}

/// The per-tick event queue. One instance per world, owned by the tick
/// scheduler and passed by reference to every producer and consumer.
#[derive(Debug, Default)]
pub struct EventSystem {
    events: Vec<GameEvent>,
}

impl EventSystem {
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event to the current tick's queue. Insertion order is
    /// preserved; there is no cross-producer ordering guarantee beyond that.
    pub fn add_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// All events produced this tick, in insertion order.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// All events of one kind produced this tick. Non-destructive: many
    /// consumers may read the same events.
    pub fn events_of(&self, kind: EventKind) -> impl Iterator<Item = &GameEvent> {
        self.events.iter().filter(move |e| e.kind() == kind)
    }

    /// Component lifecycle events filtered to one component kind — e.g.
    /// "a player connected" is `(Added, ComponentKind::Player)`.
    pub fn component_events(
        &self,
        lifecycle: ComponentEventKind,
        component: ComponentKind,
    ) -> impl Iterator<Item = EntityId> {
        self.events.iter().filter_map(move |e| match (lifecycle, e) {
            (ComponentEventKind::Added, GameEvent::ComponentAdded { entity, kind })
            | (ComponentEventKind::Removed, GameEvent::ComponentRemoved { entity, kind })
            | (ComponentEventKind::Updated, GameEvent::ComponentUpdated { entity, kind })
                if *kind == component =>
            {
                Some(*entity)
            }
            _ => None,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Discard the queue. Invoked once per tick, after consumers run.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_starts_empty_and_preserves_order() {
        let mut events = EventSystem::new();
        assert!(events.is_empty());

        events.add_event(GameEvent::EntityDestroyed {
            entity: EntityId(1),
        });
        events.add_event(GameEvent::EntityDestroyed {
            entity: EntityId(2),
        });

        let ids: Vec<EntityId> = events
            .events_of(EventKind::EntityDestroyed)
            .map(|e| match e {
                GameEvent::EntityDestroyed { entity } => *entity,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(ids, vec![EntityId(1), EntityId(2)]);
    }

    #[test]
    fn test_reads_are_non_destructive() {
        let mut events = EventSystem::new();
        events.add_event(GameEvent::ItemUsed {
            entity: EntityId(3),
            item_id: "potion".into(),
        });
        assert_eq!(events.events_of(EventKind::ItemUsed).count(), 1);
        assert_eq!(events.events_of(EventKind::ItemUsed).count(), 1);
    }

    #[test]
    fn test_component_events_filter_by_kind() {
        let mut events = EventSystem::new();
        events.add_event(GameEvent::ComponentAdded {
            entity: EntityId(1),
            kind: ComponentKind::Player,
        });
        events.add_event(GameEvent::ComponentAdded {
            entity: EntityId(2),
            kind: ComponentKind::Health,
        });
        events.add_event(GameEvent::ComponentRemoved {
            entity: EntityId(3),
            kind: ComponentKind::Player,
        });

        let joined: Vec<EntityId> = events
            .component_events(ComponentEventKind::Added, ComponentKind::Player)
            .collect();
        assert_eq!(joined, vec![EntityId(1)]);

        let left: Vec<EntityId> = events
            .component_events(ComponentEventKind::Removed, ComponentKind::Player)
            .collect();
        assert_eq!(left, vec![EntityId(3)]);
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut events = EventSystem::new();
        events.add_event(GameEvent::EntityDestroyed {
            entity: EntityId(1),
        });
        events.clear();
        assert!(events.is_empty());
        assert_eq!(events.events_of(EventKind::EntityDestroyed).count(), 0);
    }
}
