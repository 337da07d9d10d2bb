//! The scriptable tick hook — the single extension point for game-mode
//! logic.
//!
//! A game mode registers one callback invoked every tick with the elapsed
//! time and the live world state, after the physics step and before the
//! network flush: it can react to this tick's physics-driven events and its
//! own mutations still make this tick's outbound delta. Re-registering
//! replaces the previous hook (last registration wins). The core never
//! depends on any specific mode.

use game_core::event::EventSystem;
use game_core::manager::EntityManager;

use crate::physics::PhysicsEngine;
use crate::tasks::TaskScheduler;

/// Live world state handed to the tick hook and to delayed tasks.
pub struct ScriptCtx<'a> {
    pub entities: &'a mut EntityManager,
    pub events: &'a mut EventSystem,
    pub physics: &'a mut dyn PhysicsEngine,
    pub tasks: &'a mut TaskScheduler,
    /// Server uptime in seconds, as of this tick.
    pub elapsed: f64,
}

/// A registered game-mode tick callback: `(dt_seconds, world)`.
pub type TickHook = Box<dyn FnMut(f64, &mut ScriptCtx)>;
