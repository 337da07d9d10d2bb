//! Server-only control components. These never reach the wire: player input
//! is consumed by the movement step, and physics handles are opaque
//! references into the external physics engine.

use serde::{Deserialize, Serialize};

/// Latest decoded input state for a player entity. Overwritten in place by
/// each inbound INPUT message.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Input {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub space: bool,
    /// Facing angle in radians, validated finite on receipt.
    pub angle: f32,
}

/// Opaque handle into the external physics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);

/// Links an entity to its rigid body in the physics engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PhysicsBody {
    pub handle: BodyHandle,
}

impl PhysicsBody {
    #[must_use]
    pub fn new(handle: BodyHandle) -> Self {
        Self { handle }
    }
}
