//! The external physics engine seam.
//!
//! The simulation consumes physics as an opaque engine: body handles with
//! translate/rotate/velocity/impulse operations plus a per-tick contact feed
//! keyed by colliding entity ids. Rigid-body math and collision detection
//! live entirely behind this trait.

use std::collections::HashMap;

use glam::{Quat, Vec3};

use game_core::components::BodyHandle;
use game_core::entity::EntityId;

/// Two bodies started or stopped touching this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub a: EntityId,
    pub b: EntityId,
    pub started: bool,
}

/// An opaque physics engine driving entity motion.
pub trait PhysicsEngine {
    /// Register a body for an entity at `position`.
    fn create_body(&mut self, entity: EntityId, position: Vec3) -> BodyHandle;

    /// Drop a body. Unknown handles are a no-op.
    fn remove_body(&mut self, handle: BodyHandle);

    /// Advance the simulation by `dt` seconds and report contact changes.
    fn step(&mut self, dt: f64) -> Vec<Contact>;

    /// Teleport a body to an absolute position.
    fn translate(&mut self, handle: BodyHandle, position: Vec3);

    /// Set a body's absolute orientation.
    fn set_rotation(&mut self, handle: BodyHandle, rotation: Quat);

    /// Set a body's linear velocity.
    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec3);

    /// Apply an instantaneous impulse.
    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3);

    /// Current position and orientation of a body.
    fn body_transform(&self, handle: BodyHandle) -> Option<(Vec3, Quat)>;

    /// Current linear velocity of a body.
    fn body_velocity(&self, handle: BodyHandle) -> Option<Vec3>;
}

#[derive(Debug, Clone, Copy)]
struct Body {
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
}

/// A minimal engine that integrates velocities and reports no contacts.
/// Enough for tests and local demos; a real rigid-body engine plugs in
/// behind [`PhysicsEngine`] for production worlds.
#[derive(Debug, Default)]
pub struct KinematicPhysics {
    bodies: HashMap<BodyHandle, Body>,
    next_handle: u64,
}

impl KinematicPhysics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PhysicsEngine for KinematicPhysics {
    fn create_body(&mut self, _entity: EntityId, position: Vec3) -> BodyHandle {
        self.next_handle += 1;
        let handle = BodyHandle(self.next_handle);
        self.bodies.insert(
            handle,
            Body {
                position,
                rotation: Quat::IDENTITY,
                velocity: Vec3::ZERO,
            },
        );
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        self.bodies.remove(&handle);
    }

    fn step(&mut self, dt: f64) -> Vec<Contact> {
        for body in self.bodies.values_mut() {
            body.position += body.velocity * dt as f32;
        }
        Vec::new()
    }

    fn translate(&mut self, handle: BodyHandle, position: Vec3) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.position = position;
        }
    }

    fn set_rotation(&mut self, handle: BodyHandle, rotation: Quat) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.rotation = rotation;
        }
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.velocity = velocity;
        }
    }

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.velocity += impulse;
        }
    }

    fn body_transform(&self, handle: BodyHandle) -> Option<(Vec3, Quat)> {
        self.bodies.get(&handle).map(|b| (b.position, b.rotation))
    }

    fn body_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&handle).map(|b| b.velocity)
    }
}
