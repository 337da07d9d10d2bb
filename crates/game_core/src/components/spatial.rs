//! Spatial components: position, rotation, size, and spawn anchors.
//!
//! Positions and rotations serialize as fixed-shape numeric records so every
//! wire payload for them has a predictable size.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// World-space position of an entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    /// Position in world units.
    pub coords: Vec3,
    /// Dirty flag — pending broadcast.
    #[serde(skip)]
    pub updated: bool,
}

impl Position {
    /// Create a position at the given coordinates, already flagged for the
    /// initial broadcast.
    #[must_use]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            coords: Vec3::new(x, y, z),
            updated: true,
        }
    }

    /// Move to an absolute position.
    pub fn set(&mut self, coords: Vec3) {
        self.coords = coords;
        self.updated = true;
    }

    /// Offset the position by `delta`.
    pub fn translate(&mut self, delta: Vec3) {
        self.coords += delta;
        self.updated = true;
    }
}

/// Orientation of an entity as a unit quaternion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rotation {
    /// Unit quaternion orientation.
    pub quat: Quat,
    /// Dirty flag — pending broadcast.
    #[serde(skip)]
    pub updated: bool,
}

impl Rotation {
    /// Identity orientation, flagged for the initial broadcast.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            quat: Quat::IDENTITY,
            updated: true,
        }
    }

    /// Set an absolute orientation.
    pub fn set(&mut self, quat: Quat) {
        self.quat = quat;
        self.updated = true;
    }
}

/// Axis-aligned dimensions of an entity's visual bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    /// Dirty flag — pending broadcast.
    #[serde(skip)]
    pub updated: bool,
}

impl Size {
    #[must_use]
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
            updated: true,
        }
    }

    /// Resize, flagging for broadcast.
    pub fn set(&mut self, width: f32, height: f32, depth: f32) {
        self.width = width;
        self.height = height;
        self.depth = depth;
        self.updated = true;
    }
}

/// Server-only respawn/checkpoint anchor. Hot-swapping the anchor by adding
/// a fresh `SpawnPosition` over the old one is intentional.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SpawnPosition {
    /// Respawn point in world units.
    pub coords: Vec3,
}

impl SpawnPosition {
    #[must_use]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            coords: Vec3::new(x, y, z),
        }
    }

    /// Move the checkpoint.
    pub fn set(&mut self, coords: Vec3) {
        self.coords = coords;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_position_is_dirty() {
        let pos = Position::new(1.0, 2.0, 3.0);
        assert!(pos.updated);
        assert_eq!(pos.coords, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_translate_sets_dirty() {
        let mut pos = Position::new(0.0, 0.0, 0.0);
        pos.updated = false;
        pos.translate(Vec3::new(1.0, 0.0, -2.0));
        assert!(pos.updated);
        assert_eq!(pos.coords, Vec3::new(1.0, 0.0, -2.0));
    }

    #[test]
    fn test_dirty_flag_not_serialized() {
        let pos = Position::new(4.0, 5.0, 6.0);
        let bytes = rmp_serde::to_vec(&pos).unwrap();
        let restored: Position = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(restored.coords, pos.coords);
        assert!(!restored.updated, "dirty flag must not travel on the wire");
    }

    #[test]
    fn test_rotation_set_marks_dirty() {
        let mut rot = Rotation::identity();
        rot.updated = false;
        rot.set(Quat::from_rotation_y(1.0));
        assert!(rot.updated);
    }
}
