//! The tick scheduler.
//!
//! One [`TickLoop`] owns the entire world: registry, event queue, physics
//! engine, client registry, task scheduler, and the registered game-mode
//! hook. Every tick runs the same fixed order on one thread:
//!
//! 1. drain and dispatch inbound client messages
//! 2. run delayed tasks that have come due
//! 3. step physics and emit collision events
//! 4. write body transforms back into spatial components
//! 5. apply player input as movement
//! 6. run the game-mode hook
//! 7. flush the network delta
//! 8. clear the event queue
//!
//! Nothing in the loop blocks and nothing runs concurrently with it, so no
//! world state ever needs a lock.
//!
//! One deliberate exception to "the queue is empty at tick start": clients
//! whose send failed in step 7 are torn down after step 8, because tearing
//! them down earlier would clear their removal records before anyone heard
//! them. Those records are queued across the boundary and ride the next
//! tick's delta.

use std::time::{Duration, Instant};

use glam::{Quat, Vec3};
use tracing::{debug, info, warn};

use game_core::component::ComponentKind;
use game_core::components::{
    BodyHandle, Chat, ColorTint, Health, Input, Inventory, PhysicsBody, Player, Position, Rotation,
    SpawnPosition, Text,
};
use game_core::entity::EntityId;
use game_core::event::{EventSystem, GameEvent, MessageScope};
use game_core::manager::EntityManager;
use game_net::channel::MessageChannel;
use game_net::messages::ClientMessage;

use crate::clients::{Client, ClientId, ClientRegistry};
use crate::config::ServerConfig;
use crate::physics::PhysicsEngine;
use crate::script::{ScriptCtx, TickHook};
use crate::sync;
use crate::tasks::TaskScheduler;
use crate::{inbound, SERVER_AUTHOR};

/// Horizontal movement speed in world units per second.
const PLAYER_SPEED: f32 = 5.0;
/// Upward impulse applied on a jump.
const JUMP_IMPULSE: f32 = 6.0;
/// Where new players appear.
const SPAWN_POINT: Vec3 = Vec3::new(0.0, 1.0, 0.0);
/// Initial tints assigned to players round-robin by entity id.
const PLAYER_COLORS: [&str; 6] = [
    "#e63946", "#f4a261", "#2a9d8f", "#457b9d", "#9b5de5", "#f1faee",
];

/// The authoritative simulation loop.
pub struct TickLoop {
    config: ServerConfig,
    tick_id: u64,
    elapsed: f64,
    entities: EntityManager,
    events: EventSystem,
    physics: Box<dyn PhysicsEngine>,
    clients: ClientRegistry,
    tasks: TaskScheduler,
    hook: Option<TickHook>,
    chat_entity: EntityId,
}

impl TickLoop {
    /// Build a world with the singleton chat entity already in place.
    #[must_use]
    pub fn new(config: ServerConfig, physics: Box<dyn PhysicsEngine>) -> Self {
        let mut entities = EntityManager::new();
        let mut events = EventSystem::new();
        let chat_entity = entities.create_entity();
        entities.add_component(chat_entity, Chat::new(config.chat_backlog).into(), &mut events);
        // Bootstrap happens before any client exists; start the first tick
        // with an empty queue.
        events.clear();

        Self {
            config,
            tick_id: 0,
            elapsed: 0.0,
            entities,
            events,
            physics,
            clients: ClientRegistry::new(),
            tasks: TaskScheduler::new(),
            hook: None,
            chat_entity,
        }
    }

    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// Server uptime in seconds.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// The singleton entity carrying the chat backlog.
    #[must_use]
    pub fn chat_entity(&self) -> EntityId {
        self.chat_entity
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    #[must_use]
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// The player entity driven by a connected client.
    #[must_use]
    pub fn player_entity(&self, client: ClientId) -> Option<EntityId> {
        self.clients.get(client).map(|c| c.player)
    }

    /// Register the game-mode tick hook. Last registration wins.
    pub fn set_hook(&mut self, hook: TickHook) {
        if self.hook.replace(hook).is_some() {
            info!("tick hook replaced");
        }
    }

    /// Borrow the world the way the tick hook sees it, for game-mode setup
    /// before the loop starts.
    pub fn world(&mut self) -> ScriptCtx<'_> {
        ScriptCtx {
            entities: &mut self.entities,
            events: &mut self.events,
            physics: self.physics.as_mut(),
            tasks: &mut self.tasks,
            elapsed: self.elapsed,
        }
    }

    /// Accept a connection and spawn its player entity.
    ///
    /// The full state of the world reaches the client on the next flush; a
    /// welcome tip follows once the configured delay elapses.
    pub fn connect_client(&mut self, channel: MessageChannel) -> ClientId {
        let player = self.entities.create_entity();
        let name = format!("Guest-{player}");
        let color = PLAYER_COLORS[(player.raw() as usize) % PLAYER_COLORS.len()];
        let handle = self.physics.create_body(player, SPAWN_POINT);

        let ev = &mut self.events;
        self.entities.add_component(
            player,
            Position::new(SPAWN_POINT.x, SPAWN_POINT.y, SPAWN_POINT.z).into(),
            ev,
        );
        self.entities.add_component(player, Rotation::identity().into(), ev);
        self.entities.add_component(player, Player::new(&name).into(), ev);
        self.entities.add_component(player, Text::new(&name, 1.2, 40.0).into(), ev);
        self.entities.add_component(player, ColorTint::new(color).into(), ev);
        self.entities.add_component(player, Health::new(100, 100).into(), ev);
        self.entities.add_component(player, Inventory::new(20).into(), ev);
        self.entities.add_component(player, game_core::components::Score::new(0).into(), ev);
        self.entities.add_component(player, Input::default().into(), ev);
        self.entities.add_component(player, PhysicsBody::new(handle).into(), ev);
        self.entities.add_component(
            player,
            SpawnPosition::new(SPAWN_POINT.x, SPAWN_POINT.y, SPAWN_POINT.z).into(),
            ev,
        );

        let id = self.clients.insert(Client::new(channel, player));
        info!(client = %id, player = %player, "client connected");

        self.tasks.schedule_in(self.elapsed, self.config.welcome_delay, move |ctx| {
            // The player may already be gone; a stale task is a no-op.
            let Some(entity) = ctx.entities.entity(player) else {
                return;
            };
            let name = entity.player().map_or("player", |p| p.name.as_str());
            ctx.events.add_event(GameEvent::Message {
                entity: EntityId::INVALID,
                author: SERVER_AUTHOR.into(),
                content: format!("Welcome aboard, {name}! Press T to chat."),
                scope: MessageScope::TargetedNotification,
                targets: vec![player],
            });
        });

        id
    }

    /// Tear a connection down: drop the client, its physics body, and its
    /// player entity. Unknown ids are a no-op.
    pub fn disconnect_client(&mut self, id: ClientId) {
        let Some(client) = self.clients.remove(id) else {
            return;
        };
        let handle = self
            .entities
            .entity(client.player)
            .and_then(|e| e.physics_body())
            .map(|b| b.handle);
        if let Some(handle) = handle {
            self.physics.remove_body(handle);
        }
        self.entities.destroy_entity(client.player, &mut self.events);
        info!(client = %id, player = %client.player, "client disconnected");
    }

    /// Run one tick of `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        self.tick_id += 1;
        self.elapsed += dt;

        self.drain_inbound();
        self.run_due_tasks();

        let contacts = self.physics.step(dt);
        for contact in contacts {
            self.events.add_event(GameEvent::Collision {
                a: contact.a,
                b: contact.b,
                started: contact.started,
            });
        }

        self.write_back_transforms();
        self.apply_input();
        self.run_hook(dt);
        self.apply_color_changes();

        let failed = sync::flush(&mut self.entities, &self.events, &mut self.clients);
        self.events.clear();
        // Teardown runs after the queue reset so the departed players'
        // removal records survive into the next tick's flush.
        for id in failed {
            self.disconnect_client(id);
        }
    }

    /// Drive the loop at the configured rate until `max_ticks` is reached
    /// (forever when it is 0).
    pub async fn run(&mut self) {
        let dt = 1.0 / self.config.tick_rate;
        let mut interval = tokio::time::interval(Duration::from_secs_f64(dt));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(tick_rate = self.config.tick_rate, "tick loop started");

        loop {
            interval.tick().await;
            let started = Instant::now();
            self.tick(dt);
            let spent = started.elapsed().as_secs_f64();
            if spent > dt {
                warn!(
                    tick = self.tick_id,
                    spent_ms = spent * 1000.0,
                    budget_ms = dt * 1000.0,
                    "tick exceeded its budget"
                );
            }
            if self.config.max_ticks != 0 && self.tick_id >= self.config.max_ticks {
                info!(ticks = self.tick_id, "tick limit reached, stopping");
                break;
            }
        }
    }

    /// Drain every queued frame from every client and dispatch it.
    /// Malformed frames are logged and dropped; validation failures surface
    /// only to the offending client.
    fn drain_inbound(&mut self) {
        let mut rejections: Vec<(EntityId, String)> = Vec::new();
        for client in self.clients.iter_mut() {
            while let Some(frame) = client.channel.try_recv() {
                let message: ClientMessage = match game_net::decode(&frame) {
                    Ok(message) => message,
                    Err(err) => {
                        warn!(client = %client.id, %err, "dropping malformed frame");
                        continue;
                    }
                };
                if let Err(err) = inbound::dispatch(
                    client,
                    message,
                    &mut self.entities,
                    &mut self.events,
                    &self.config,
                    self.chat_entity,
                    self.elapsed,
                ) {
                    debug!(client = %client.id, %err, "rejected client message");
                    rejections.push((client.player, err.to_string()));
                }
            }
        }
        for (player, reason) in rejections {
            self.events.add_event(GameEvent::Message {
                entity: EntityId::INVALID,
                author: SERVER_AUTHOR.into(),
                content: reason,
                scope: MessageScope::TargetedNotification,
                targets: vec![player],
            });
        }
    }

    fn run_due_tasks(&mut self) {
        let due = self.tasks.take_due(self.elapsed);
        if due.is_empty() {
            return;
        }
        let mut ctx = ScriptCtx {
            entities: &mut self.entities,
            events: &mut self.events,
            physics: self.physics.as_mut(),
            tasks: &mut self.tasks,
            elapsed: self.elapsed,
        };
        for task in due {
            task(&mut ctx);
        }
    }

    /// Copy stepped body transforms into the network-visible spatial
    /// components, marking them dirty only when they actually moved.
    fn write_back_transforms(&mut self) {
        for entity in self.entities.iter_mut() {
            let Some(handle) = entity.physics_body().map(|b| b.handle) else {
                continue;
            };
            let Some((position, rotation)) = self.physics.body_transform(handle) else {
                continue;
            };
            if let Some(component) = entity.position_mut() {
                if component.coords != position {
                    component.set(position);
                }
            }
            if let Some(component) = entity.rotation_mut() {
                if component.quat != rotation {
                    component.set(rotation);
                }
            }
        }
    }

    /// Turn each player's latest input into a velocity and facing for the
    /// next physics step.
    fn apply_input(&mut self) {
        let mut moves: Vec<(BodyHandle, Input)> = Vec::new();
        for entity in self.entities.iter() {
            if let (Some(input), Some(body)) = (entity.input(), entity.physics_body()) {
                moves.push((body.handle, *input));
            }
        }
        for (handle, input) in moves {
            let mut dir = Vec3::ZERO;
            if input.up {
                dir.z -= 1.0;
            }
            if input.down {
                dir.z += 1.0;
            }
            if input.left {
                dir.x -= 1.0;
            }
            if input.right {
                dir.x += 1.0;
            }
            let planar = if dir == Vec3::ZERO {
                Vec3::ZERO
            } else {
                dir.normalize() * PLAYER_SPEED
            };
            let vertical = self.physics.body_velocity(handle).map_or(0.0, |v| v.y);
            self.physics
                .set_velocity(handle, Vec3::new(planar.x, vertical, planar.z));
            self.physics.set_rotation(handle, Quat::from_rotation_y(input.angle));
            if input.space && vertical.abs() < f32::EPSILON {
                self.physics.apply_impulse(handle, Vec3::Y * JUMP_IMPULSE);
            }
        }
    }

    /// Apply retint requests raised this tick. Runs after the hook so a
    /// game mode's color changes still make this tick's delta.
    fn apply_color_changes(&mut self) {
        let changes: Vec<(EntityId, String)> = self
            .events
            .events()
            .iter()
            .filter_map(|ev| match ev {
                GameEvent::ColorChange { entity, color } => Some((*entity, color.clone())),
                _ => None,
            })
            .collect();
        for (entity, color) in changes {
            if let Some(tint) = self.entities.entity_mut(entity).and_then(|e| e.color_mut()) {
                tint.set_color(color);
                self.events.add_event(GameEvent::ComponentUpdated {
                    entity,
                    kind: ComponentKind::Color,
                });
            }
        }
    }

    fn run_hook(&mut self, dt: f64) {
        let Some(mut hook) = self.hook.take() else {
            return;
        };
        {
            let mut ctx = ScriptCtx {
                entities: &mut self.entities,
                events: &mut self.events,
                physics: self.physics.as_mut(),
                tasks: &mut self.tasks,
                elapsed: self.elapsed,
            };
            hook(dt, &mut ctx);
        }
        self.hook = Some(hook);
    }
}

impl std::fmt::Debug for TickLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickLoop")
            .field("tick_id", &self.tick_id)
            .field("elapsed", &self.elapsed)
            .field("entities", &self.entities.entity_count())
            .field("clients", &self.clients.len())
            .field("tasks", &self.tasks.pending_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::physics::{Contact, KinematicPhysics};
    use game_net::messages::{Delta, EventRecord};

    const DT: f64 = 0.05;

    fn test_loop() -> TickLoop {
        let config = ServerConfig {
            welcome_delay: 0.1,
            ..ServerConfig::default()
        };
        TickLoop::new(config, Box::new(KinematicPhysics::new()))
    }

    fn recv_delta(remote: &mut MessageChannel) -> Option<Delta> {
        remote.try_recv().map(|bytes| game_net::decode(&bytes).unwrap())
    }

    fn drain(remote: &mut MessageChannel) {
        while remote.try_recv().is_some() {}
    }

    #[test]
    fn test_tick_advances_clock_and_clears_events() {
        let mut world = test_loop();
        world.tick(DT);
        world.tick(DT);
        assert_eq!(world.tick_id(), 2);
        assert!((world.elapsed() - 2.0 * DT).abs() < 1e-9);
        assert!(world.events.is_empty());
    }

    #[test]
    fn test_connect_spawns_player_and_snapshots() {
        let mut world = test_loop();
        let (server_end, mut remote) = MessageChannel::pair();
        let id = world.connect_client(server_end);
        let player = world.player_entity(id).unwrap();
        assert!(world.entities.has_component(player, ComponentKind::Health));
        assert!(world.entities.has_component(player, ComponentKind::Input));

        world.tick(DT);
        let delta = recv_delta(&mut remote).unwrap();
        assert!(
            delta.created.iter().any(|r| r.entity == player),
            "first flush carries the player's components"
        );
    }

    #[test]
    fn test_welcome_tip_arrives_after_delay() {
        let mut world = test_loop();
        let (server_end, mut remote) = MessageChannel::pair();
        world.connect_client(server_end);

        world.tick(DT); // snapshot tick, welcome still pending
        drain(&mut remote);
        world.tick(DT);
        world.tick(DT); // elapsed 0.15 > welcome_delay 0.1

        let mut greeted = false;
        while let Some(delta) = recv_delta(&mut remote) {
            greeted |= delta.events.iter().any(|ev| {
                matches!(
                    ev,
                    EventRecord::Message { scope, .. }
                        if *scope == MessageScope::TargetedNotification
                )
            });
        }
        assert!(greeted);
    }

    #[test]
    fn test_input_drives_movement() {
        let mut world = test_loop();
        let (server_end, remote) = MessageChannel::pair();
        let id = world.connect_client(server_end);
        let player = world.player_entity(id).unwrap();
        let start = world.entities.entity(player).unwrap().position().unwrap().coords;

        let frame = game_net::encode(&ClientMessage::Input {
            up: true,
            down: false,
            left: false,
            right: false,
            space: false,
            angle: 0.0,
        })
        .unwrap();
        remote.send(frame).unwrap();

        world.tick(DT); // input applied, velocity set
        world.tick(DT); // step integrates, transform written back

        let end = world.entities.entity(player).unwrap().position().unwrap().coords;
        assert_ne!(start, end);
        assert!(end.z < start.z, "up input moves along -z");
    }

    #[test]
    fn test_hook_runs_each_tick_and_replacement_wins() {
        let mut world = test_loop();
        let first = Rc::new(RefCell::new(0u32));
        let second = Rc::new(RefCell::new(0u32));

        let counter = Rc::clone(&first);
        world.set_hook(Box::new(move |_, _| *counter.borrow_mut() += 1));
        world.tick(DT);
        world.tick(DT);
        assert_eq!(*first.borrow(), 2);

        let counter = Rc::clone(&second);
        world.set_hook(Box::new(move |_, _| *counter.borrow_mut() += 1));
        world.tick(DT);
        assert_eq!(*first.borrow(), 2, "replaced hook never runs again");
        assert_eq!(*second.borrow(), 1);
    }

    #[test]
    fn test_hook_sees_collision_events() {
        struct CollidingPhysics(KinematicPhysics);
        impl PhysicsEngine for CollidingPhysics {
            fn create_body(&mut self, entity: EntityId, position: Vec3) -> BodyHandle {
                self.0.create_body(entity, position)
            }
            fn remove_body(&mut self, handle: BodyHandle) {
                self.0.remove_body(handle);
            }
            fn step(&mut self, dt: f64) -> Vec<Contact> {
                self.0.step(dt);
                vec![Contact {
                    a: EntityId::from_raw(101),
                    b: EntityId::from_raw(102),
                    started: true,
                }]
            }
            fn translate(&mut self, handle: BodyHandle, position: Vec3) {
                self.0.translate(handle, position);
            }
            fn set_rotation(&mut self, handle: BodyHandle, rotation: Quat) {
                self.0.set_rotation(handle, rotation);
            }
            fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
                self.0.set_velocity(handle, velocity);
            }
            fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) {
                self.0.apply_impulse(handle, impulse);
            }
            fn body_transform(&self, handle: BodyHandle) -> Option<(Vec3, Quat)> {
                self.0.body_transform(handle)
            }
            fn body_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
                self.0.body_velocity(handle)
            }
        }

        let mut world = TickLoop::new(
            ServerConfig::default(),
            Box::new(CollidingPhysics(KinematicPhysics::new())),
        );
        let seen = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&seen);
        world.set_hook(Box::new(move |_, ctx| {
            *flag.borrow_mut() |= ctx
                .events
                .events()
                .iter()
                .any(|ev| matches!(ev, GameEvent::Collision { started: true, .. }));
        }));

        world.tick(DT);
        assert!(*seen.borrow());
        assert!(world.events.is_empty(), "collision events are tick-scoped");
    }

    #[test]
    fn test_color_change_event_retints_entity() {
        let mut world = test_loop();
        let e = world.entities.create_entity();
        world
            .entities
            .add_component(e, ColorTint::new("#ffffff").into(), &mut world.events);
        world.set_hook(Box::new(move |_, ctx| {
            ctx.events.add_event(GameEvent::ColorChange {
                entity: e,
                color: "#ff0000".into(),
            });
        }));

        world.tick(DT);

        let tint = world.entities.entity(e).unwrap().color().unwrap();
        assert_eq!(tint.color, "#ff0000");
    }

    #[test]
    fn test_stale_task_is_noop() {
        let mut world = test_loop();
        let target = world.entities.create_entity();
        world
            .entities
            .add_component(target, Health::new(10, 10).into(), &mut world.events);

        world.world().tasks.schedule_in(0.0, DT, move |ctx| {
            if let Some(health) = ctx.entities.entity_mut(target).and_then(|e| e.health_mut()) {
                health.heal(5);
            }
        });
        world.entities.destroy_entity(target, &mut world.events);

        world.tick(DT);
        world.tick(DT);
        assert!(!world.entities.entity_exists(target));
    }

    #[test]
    fn test_disconnect_destroys_player() {
        let mut world = test_loop();
        let (server_end, _remote) = MessageChannel::pair();
        let id = world.connect_client(server_end);
        let player = world.player_entity(id).unwrap();

        world.disconnect_client(id);
        assert!(!world.entities.entity_exists(player));
        assert_eq!(world.client_count(), 0);
        // Idempotent.
        world.disconnect_client(id);
    }

    #[test]
    fn test_dropped_remote_torn_down_on_flush() {
        let mut world = test_loop();
        let (server_end, remote) = MessageChannel::pair();
        let id = world.connect_client(server_end);
        let player = world.player_entity(id).unwrap();

        drop(remote);
        world.tick(DT);

        assert_eq!(world.client_count(), 0);
        assert!(!world.entities.entity_exists(player));
    }

    #[test]
    fn test_departed_client_removal_reaches_survivors_next_tick() {
        let mut world = test_loop();
        let (alice_end, mut alice_remote) = MessageChannel::pair();
        let (bob_end, bob_remote) = MessageChannel::pair();
        world.connect_client(alice_end);
        let bob = world.connect_client(bob_end);
        let bob_player = world.player_entity(bob).unwrap();

        world.tick(DT);
        drain(&mut alice_remote);

        // Bob vanishes; his teardown happens after this tick's flush.
        drop(bob_remote);
        world.tick(DT);
        drain(&mut alice_remote);
        assert_eq!(world.client_count(), 1);

        // The next flush still tells alice bob's player is gone.
        world.tick(DT);
        let mut saw_removal = false;
        let mut saw_destroy = false;
        while let Some(delta) = recv_delta(&mut alice_remote) {
            saw_removal |= delta.removed.iter().any(|r| r.entity == bob_player);
            saw_destroy |= delta.events.iter().any(|ev| {
                matches!(ev, EventRecord::EntityDestroyed { entity } if *entity == bob_player)
            });
        }
        assert!(saw_removal, "removal records crossed the tick boundary");
        assert!(saw_destroy);
    }

    #[tokio::test]
    async fn test_run_stops_at_tick_limit() {
        let config = ServerConfig {
            tick_rate: 200.0,
            max_ticks: 3,
            ..ServerConfig::default()
        };
        let mut world = TickLoop::new(config, Box::new(KinematicPhysics::new()));
        world.run().await;
        assert_eq!(world.tick_id(), 3);
    }
}
