//! Concrete component types.
//!
//! Network-visible components carry an `updated` dirty flag (never
//! serialized): every mutating method that must reach clients sets it, and
//! only the network sync layer clears it after a flush.

mod control;
mod inventory;
mod social;
mod spatial;
mod status;

pub use control::{BodyHandle, Input, PhysicsBody};
pub use inventory::{Inventory, Item};
pub use social::{Chat, ChatEntry, ColorTint, Player, ProximityPrompt, Text};
pub use spatial::{Position, Rotation, Size, SpawnPosition};
pub use status::{Health, Score, Team};
