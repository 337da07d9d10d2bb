//! The per-client dirty-diff network flush.
//!
//! Each tick, after the scripted hook has run, the sync layer scans the
//! tick's events and every network component's dirty flag, builds one
//! shared `created`/`updated`/`removed`/`events` set, and sends each client
//! its view of it: a newly connected client receives the full state of
//! every live network component as `created` before any incremental delta;
//! an established client receives only what changed this tick. Dirty flags
//! are cleared exactly once, after the per-client loop, so one client's
//! failed send never disturbs what the others are told.

use std::collections::HashSet;

use tracing::{error, warn};

use game_core::component::Component;
use game_core::entity::EntityId;
use game_core::event::{EventSystem, GameEvent};
use game_core::manager::EntityManager;
use game_net::messages::{ComponentRecord, Delta, EventRecord, RemovedRecord};

use crate::clients::{ClientId, ClientRegistry};

/// Serialize one component into a wire record, or skip it.
///
/// A component that cannot be encoded is a defect, not a runtime condition
/// to recover from: it is logged at error level and its record dropped so
/// the rest of the flush proceeds.
fn wire_record(entity: EntityId, component: &Component) -> Option<ComponentRecord> {
    let data = component.to_wire()?;
    if let Err(err) = game_net::encode(&data) {
        error!(
            entity = %entity,
            kind = %component.kind(),
            %err,
            "component serialization failed, skipping record"
        );
        return None;
    }
    Some(ComponentRecord {
        entity,
        kind: component.kind(),
        data,
    })
}

/// The full state of every live network component, for a client's first
/// flush.
fn full_snapshot(entities: &EntityManager) -> Vec<ComponentRecord> {
    let mut records = Vec::new();
    for entity in entities.iter() {
        for component in entity.components() {
            if let Some(record) = wire_record(entity.id(), component) {
                records.push(record);
            }
        }
    }
    records
}

/// Broadcastable event records with their delivery target lists. An empty
/// target list means "everyone".
fn broadcast_events(events: &EventSystem) -> Vec<(EventRecord, Vec<EntityId>)> {
    let mut records = Vec::new();
    for event in events.events() {
        match event {
            GameEvent::Message {
                author,
                content,
                scope,
                targets,
                ..
            } => {
                records.push((
                    EventRecord::Message {
                        author: author.clone(),
                        content: content.clone(),
                        scope: *scope,
                    },
                    targets.clone(),
                ));
            }
            GameEvent::EntityDestroyed { entity } => {
                records.push((EventRecord::EntityDestroyed { entity: *entity }, Vec::new()));
            }
            _ => {}
        }
    }
    records
}

/// Flush this tick's delta to every client.
///
/// Returns the ids of clients whose channel was found closed; the caller
/// tears those connections down. Failures are isolated per client and never
/// abort the flush.
pub fn flush(
    entities: &mut EntityManager,
    events: &EventSystem,
    clients: &mut ClientRegistry,
) -> Vec<ClientId> {
    // Shared sets, built once per tick.
    let mut created: Vec<ComponentRecord> = Vec::new();
    let mut created_keys: HashSet<(EntityId, game_core::ComponentKind)> = HashSet::new();
    let mut removed: Vec<RemovedRecord> = Vec::new();

    for event in events.events() {
        match event {
            GameEvent::ComponentAdded { entity, kind } if kind.is_network() => {
                // Added then removed within the same tick: nothing to send.
                let Some(component) = entities.get_component(*entity, *kind) else {
                    continue;
                };
                if let Some(record) = wire_record(*entity, component) {
                    created_keys.insert((*entity, *kind));
                    created.push(record);
                }
            }
            GameEvent::ComponentRemoved { entity, kind } if kind.is_network() => {
                removed.push(RemovedRecord {
                    entity: *entity,
                    kind: *kind,
                });
            }
            _ => {}
        }
    }

    // `updated` is exactly the dirty set, minus components that already
    // travel in `created` this tick.
    let mut updated: Vec<ComponentRecord> = Vec::new();
    for entity in entities.iter() {
        for component in entity.components() {
            if component.is_dirty() && !created_keys.contains(&(entity.id(), component.kind())) {
                if let Some(record) = wire_record(entity.id(), component) {
                    updated.push(record);
                }
            }
        }
    }

    let event_records = broadcast_events(events);

    let mut failed = Vec::new();
    for client in clients.iter_mut() {
        // A departed peer is torn down even on a quiet tick.
        if client.channel.is_closed() {
            warn!(client = %client.id, "client channel closed");
            failed.push(client.id);
            continue;
        }

        let client_events: Vec<EventRecord> = event_records
            .iter()
            .filter(|(_, targets)| targets.is_empty() || targets.contains(&client.player))
            .map(|(record, _)| record.clone())
            .collect();

        let delta = if client.initialized {
            Delta {
                created: created.clone(),
                updated: updated.clone(),
                removed: removed.clone(),
                events: client_events,
            }
        } else {
            // First flush: the complete world, independent of component age.
            Delta {
                created: full_snapshot(entities),
                updated: Vec::new(),
                removed: Vec::new(),
                events: client_events,
            }
        };

        // Established clients with nothing to hear are skipped entirely.
        if client.initialized && delta.is_empty() {
            continue;
        }

        match game_net::encode(&delta) {
            Ok(frame) => {
                if client.channel.send(frame).is_err() {
                    warn!(client = %client.id, "client channel closed during flush");
                    failed.push(client.id);
                    continue;
                }
                client.initialized = true;
            }
            Err(err) => {
                error!(client = %client.id, %err, "failed to encode delta, skipping client");
            }
        }
    }

    // Clear transmitted dirty flags exactly once, after the per-client
    // loop: a failed send for one client must not affect the others.
    for entity in entities.iter_mut() {
        for component in entity.components_mut() {
            component.clear_dirty();
        }
    }

    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::component::ComponentKind;
    use game_core::components::{Health, Position, Score};
    use game_core::event::MessageScope;
    use game_net::channel::MessageChannel;

    use crate::clients::Client;

    struct World {
        entities: EntityManager,
        events: EventSystem,
        clients: ClientRegistry,
    }

    impl World {
        fn new() -> Self {
            Self {
                entities: EntityManager::new(),
                events: EventSystem::new(),
                clients: ClientRegistry::new(),
            }
        }

        /// Connect a client whose player entity already exists.
        fn connect(&mut self, player: EntityId) -> (ClientId, MessageChannel) {
            let (server_end, remote) = MessageChannel::pair();
            let id = self.clients.insert(Client::new(server_end, player));
            (id, remote)
        }

        /// Run a flush and finish the tick the way the scheduler does.
        fn end_tick(&mut self) -> Vec<ClientId> {
            let failed = flush(&mut self.entities, &self.events, &mut self.clients);
            self.events.clear();
            failed
        }
    }

    fn recv_delta(remote: &mut MessageChannel) -> Option<Delta> {
        remote.try_recv().map(|bytes| game_net::decode(&bytes).unwrap())
    }

    #[test]
    fn test_first_flush_is_full_snapshot() {
        let mut world = World::new();
        let e = world.entities.create_entity();
        world
            .entities
            .add_component(e, Health::new(100, 100).into(), &mut world.events);
        world
            .entities
            .add_component(e, Position::new(1.0, 2.0, 3.0).into(), &mut world.events);
        // Components predate the client by a tick.
        world.end_tick();

        let (_, mut remote) = world.connect(e);
        world.end_tick();

        let delta = recv_delta(&mut remote).unwrap();
        assert_eq!(delta.created.len(), 2, "every live network component");
        assert!(delta.updated.is_empty());
        assert!(delta.removed.is_empty());
    }

    #[test]
    fn test_dirty_flag_cycle() {
        let mut world = World::new();
        let e = world.entities.create_entity();
        world
            .entities
            .add_component(e, Health::new(100, 100).into(), &mut world.events);
        let (_, mut remote) = world.connect(e);
        world.end_tick();
        recv_delta(&mut remote).unwrap(); // initial snapshot

        // Mutate: the next flush carries exactly this component as updated.
        world
            .entities
            .entity_mut(e)
            .unwrap()
            .health_mut()
            .unwrap()
            .damage(30);
        world.end_tick();

        let delta = recv_delta(&mut remote).unwrap();
        assert_eq!(delta.updated.len(), 1);
        assert_eq!(delta.updated[0].kind, ComponentKind::Health);

        // Untouched since: nothing at all is sent.
        world.end_tick();
        assert!(recv_delta(&mut remote).is_none());
    }

    #[test]
    fn test_unmutated_component_created_once_never_updated() {
        let mut world = World::new();
        let player = world.entities.create_entity();
        let (_, mut remote) = world.connect(player);
        world.end_tick();
        recv_delta(&mut remote).unwrap();

        // A new entity appears after the client is established.
        let e = world.entities.create_entity();
        world
            .entities
            .add_component(e, Score::new(0).into(), &mut world.events);
        world.end_tick();

        let delta = recv_delta(&mut remote).unwrap();
        assert_eq!(delta.created.len(), 1);
        assert!(
            delta.updated.is_empty(),
            "a component created this tick must not double as updated"
        );

        // Two quiet ticks: never seen again.
        world.end_tick();
        world.end_tick();
        assert!(recv_delta(&mut remote).is_none());
    }

    #[test]
    fn test_removal_records_and_destroy_event() {
        let mut world = World::new();
        let player = world.entities.create_entity();
        let e = world.entities.create_entity();
        world
            .entities
            .add_component(e, Health::new(50, 50).into(), &mut world.events);
        let (_, mut remote) = world.connect(player);
        world.end_tick();
        recv_delta(&mut remote).unwrap();

        world.entities.destroy_entity(e, &mut world.events);
        world.end_tick();

        let delta = recv_delta(&mut remote).unwrap();
        assert_eq!(delta.removed.len(), 1);
        assert_eq!(delta.removed[0].entity, e);
        assert!(delta
            .events
            .iter()
            .any(|ev| matches!(ev, EventRecord::EntityDestroyed { entity } if *entity == e)));
    }

    #[test]
    fn test_targeted_events_filtered_per_client() {
        let mut world = World::new();
        let alice = world.entities.create_entity();
        let bob = world.entities.create_entity();
        let (_, mut alice_remote) = world.connect(alice);
        let (_, mut bob_remote) = world.connect(bob);
        world.end_tick();
        recv_delta(&mut alice_remote).unwrap();
        recv_delta(&mut bob_remote).unwrap();

        world.events.add_event(GameEvent::Message {
            entity: EntityId::INVALID,
            author: "tips".into(),
            content: "only for alice".into(),
            scope: MessageScope::TargetedChat,
            targets: vec![alice],
        });
        world.end_tick();

        let alice_delta = recv_delta(&mut alice_remote).unwrap();
        assert_eq!(alice_delta.events.len(), 1);
        assert!(
            recv_delta(&mut bob_remote).is_none(),
            "bob hears nothing this tick"
        );
    }

    #[test]
    fn test_send_failure_isolated_to_one_client() {
        let mut world = World::new();
        let alice = world.entities.create_entity();
        let bob = world.entities.create_entity();
        world
            .entities
            .add_component(alice, Health::new(100, 100).into(), &mut world.events);
        let (_, mut alice_remote) = world.connect(alice);
        let (bob_id, bob_remote) = world.connect(bob);
        world.end_tick();
        recv_delta(&mut alice_remote).unwrap();

        // Bob vanishes without saying goodbye.
        drop(bob_remote);

        world
            .entities
            .entity_mut(alice)
            .unwrap()
            .health_mut()
            .unwrap()
            .damage(10);
        let failed = world.end_tick();

        assert_eq!(failed, vec![bob_id]);
        // Alice still received her delta, and the flag cleared normally.
        let delta = recv_delta(&mut alice_remote).unwrap();
        assert_eq!(delta.updated.len(), 1);
        world.end_tick();
        assert!(recv_delta(&mut alice_remote).is_none());
    }

    #[test]
    fn test_add_then_destroy_same_tick_sends_no_created() {
        let mut world = World::new();
        let player = world.entities.create_entity();
        let (_, mut remote) = world.connect(player);
        world.end_tick();
        recv_delta(&mut remote).unwrap();

        let e = world.entities.create_entity();
        world
            .entities
            .add_component(e, Health::new(1, 1).into(), &mut world.events);
        world.entities.destroy_entity(e, &mut world.events);
        world.end_tick();

        let delta = recv_delta(&mut remote).unwrap();
        assert!(delta.created.is_empty());
        assert_eq!(delta.removed.len(), 1);
    }
}
