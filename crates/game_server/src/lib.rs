//! # game_server
//!
//! The authoritative simulation server: a single-threaded, fixed-rate tick
//! loop that interleaves inbound dispatch, physics, scripted game-mode
//! logic, and the dirty-diff network flush.
//!
//! This crate provides:
//!
//! - [`config`] — Server configuration.
//! - [`clients`] — Per-client connection state and the client registry.
//! - [`inbound`] — Decoding and defensive validation of client messages.
//! - [`physics`] — The external physics engine seam.
//! - [`script`] — The scriptable tick-hook extension point.
//! - [`tasks`] — Delayed one-shot tasks keyed by entity id.
//! - [`sync`] — The per-client dirty-diff network flush.
//! - [`tick`] — The tick scheduler owning all world state.

/// Author name stamped on server-originated chat and notification
/// messages.
pub const SERVER_AUTHOR: &str = "server";

pub mod clients;
pub mod config;
pub mod inbound;
pub mod physics;
pub mod script;
pub mod sync;
pub mod tasks;
pub mod tick;

pub use clients::{Client, ClientId, ClientRegistry};
pub use config::ServerConfig;
pub use physics::{Contact, KinematicPhysics, PhysicsEngine};
pub use script::{ScriptCtx, TickHook};
pub use tasks::TaskScheduler;
pub use tick::TickLoop;
