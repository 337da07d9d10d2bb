//! # game_core
//!
//! The authoritative simulation model: entities, components, the tick-scoped
//! event bus, and the world registry.
//!
//! This crate provides:
//!
//! - [`entity`] — Entity identifiers, allocation, and the per-entity
//!   component map.
//! - [`component`] — The closed component union, kind identifiers, dirty
//!   flags, and the wire serialization contract.
//! - [`components`] — Concrete component types (spatial, status, inventory,
//!   social, server-only control state).
//! - [`event`] — The tick-scoped event bus.
//! - [`manager`] — The [`EntityManager`](manager::EntityManager) world
//!   registry.

pub mod component;
pub mod components;
pub mod entity;
pub mod event;
pub mod manager;

pub use component::{Component, ComponentKind, WireComponent};
pub use entity::{Entity, EntityAllocator, EntityId};
pub use event::{ComponentEventKind, EventKind, EventSystem, GameEvent, MessageScope};
pub use manager::EntityManager;
