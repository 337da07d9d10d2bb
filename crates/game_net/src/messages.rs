//! Message types exchanged with clients.
//!
//! Inbound messages carry a small discriminator plus a kind-specific
//! payload; every numeric and string field is validated server-side on
//! receipt. Outbound traffic is one [`Delta`] per client per tick.

use serde::{Deserialize, Serialize};

use game_core::component::{ComponentKind, WireComponent};
use game_core::entity::EntityId;
use game_core::event::MessageScope;

// ── Inbound ─────────────────────────────────────────────────────────────────

/// A message from a client. The enum tag is the wire discriminator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ClientMessage {
    /// Player input state for this frame.
    Input {
        up: bool,
        down: bool,
        left: bool,
        right: bool,
        space: bool,
        /// Facing angle in radians. Rejected when non-finite.
        angle: f32,
    },
    /// Chat line. Content is server-clamped regardless of declared length.
    Chat { content: String },
    /// Interaction with a proximity prompt entity. Distance and cooldown
    /// are enforced server-side.
    ProximityPromptInteract { target: EntityId },
    /// Rename request. Name is server-clamped.
    SetPlayerName { name: String },
    /// Use an item from the player's own inventory.
    UseItem { item_id: String },
}

// ── Outbound ────────────────────────────────────────────────────────────────

/// A network-visible component snapshot tied to its entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentRecord {
    pub entity: EntityId,
    pub kind: ComponentKind,
    pub data: WireComponent,
}

/// A component detached from an entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RemovedRecord {
    pub entity: EntityId,
    pub kind: ComponentKind,
}

/// A broadcastable event, mirrored from the tick's domain events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum EventRecord {
    /// Chat line or notification. Targeted scopes are filtered per client
    /// before the record is sent.
    Message {
        author: String,
        content: String,
        scope: MessageScope,
    },
    /// An entity left the world entirely.
    EntityDestroyed { entity: EntityId },
}

/// The per-tick snapshot delta sent to one client.
///
/// `updated` contains exactly the components flagged dirty this tick;
/// untouched components are omitted entirely, so outbound size is bounded by
/// the number of changes rather than world size. A newly connected client
/// instead receives the full state of every live network component in
/// `created` once, before any incremental delta.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Delta {
    pub created: Vec<ComponentRecord>,
    pub updated: Vec<ComponentRecord>,
    pub removed: Vec<RemovedRecord>,
    pub events: Vec<EventRecord>,
}

impl Delta {
    /// True when the delta carries nothing worth sending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.updated.is_empty()
            && self.removed.is_empty()
            && self.events.is_empty()
    }
}
