//! The closed component union and its kind identifiers.
//!
//! Each entity holds at most one component per [`ComponentKind`]. The union
//! is closed on purpose: kind-keyed lookup resolves statically, and the wire
//! contract ([`WireComponent`]) is exactly the network-visible subset.

use serde::{Deserialize, Serialize};

use crate::components::{
    Chat, ColorTint, Health, Input, Inventory, PhysicsBody, Player, Position, ProximityPrompt,
    Rotation, Score, Size, SpawnPosition, Team, Text,
};

/// Stable kind identifier for component storage and wire records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    Position,
    Rotation,
    Color,
    Player,
    Text,
    Chat,
    Health,
    Inventory,
    Score,
    Team,
    ProximityPrompt,
    Size,
    Input,
    PhysicsBody,
    SpawnPosition,
}

impl ComponentKind {
    /// Whether components of this kind are mirrored to clients.
    #[must_use]
    pub const fn is_network(self) -> bool {
        !matches!(
            self,
            Self::Input | Self::PhysicsBody | Self::SpawnPosition
        )
    }

    /// Human-readable kind name, used in log fields.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "Position",
            Self::Rotation => "Rotation",
            Self::Color => "Color",
            Self::Player => "Player",
            Self::Text => "Text",
            Self::Chat => "Chat",
            Self::Health => "Health",
            Self::Inventory => "Inventory",
            Self::Score => "Score",
            Self::Team => "Team",
            Self::ProximityPrompt => "ProximityPrompt",
            Self::Size => "Size",
            Self::Input => "Input",
            Self::PhysicsBody => "PhysicsBody",
            Self::SpawnPosition => "SpawnPosition",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A component attached to exactly one entity. Owned by the entity; never
/// shared.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Position(Position),
    Rotation(Rotation),
    Color(ColorTint),
    Player(Player),
    Text(Text),
    Chat(Chat),
    Health(Health),
    Inventory(Inventory),
    Score(Score),
    Team(Team),
    ProximityPrompt(ProximityPrompt),
    Size(Size),
    Input(Input),
    PhysicsBody(PhysicsBody),
    SpawnPosition(SpawnPosition),
}

impl Component {
    /// The kind this component is stored under.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Position(_) => ComponentKind::Position,
            Self::Rotation(_) => ComponentKind::Rotation,
            Self::Color(_) => ComponentKind::Color,
            Self::Player(_) => ComponentKind::Player,
            Self::Text(_) => ComponentKind::Text,
            Self::Chat(_) => ComponentKind::Chat,
            Self::Health(_) => ComponentKind::Health,
            Self::Inventory(_) => ComponentKind::Inventory,
            Self::Score(_) => ComponentKind::Score,
            Self::Team(_) => ComponentKind::Team,
            Self::ProximityPrompt(_) => ComponentKind::ProximityPrompt,
            Self::Size(_) => ComponentKind::Size,
            Self::Input(_) => ComponentKind::Input,
            Self::PhysicsBody(_) => ComponentKind::PhysicsBody,
            Self::SpawnPosition(_) => ComponentKind::SpawnPosition,
        }
    }

    /// Whether this component has pending changes to broadcast. Server-only
    /// kinds are never dirty.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        match self {
            Self::Position(c) => c.updated,
            Self::Rotation(c) => c.updated,
            Self::Color(c) => c.updated,
            Self::Player(c) => c.updated,
            Self::Text(c) => c.updated,
            Self::Chat(c) => c.updated,
            Self::Health(c) => c.updated,
            Self::Inventory(c) => c.updated,
            Self::Score(c) => c.updated,
            Self::Team(c) => c.updated,
            Self::ProximityPrompt(c) => c.updated,
            Self::Size(c) => c.updated,
            Self::Input(_) | Self::PhysicsBody(_) | Self::SpawnPosition(_) => false,
        }
    }

    /// Flag this component for broadcast. No-op for server-only kinds.
    pub fn mark_dirty(&mut self) {
        match self {
            Self::Position(c) => c.updated = true,
            Self::Rotation(c) => c.updated = true,
            Self::Color(c) => c.updated = true,
            Self::Player(c) => c.updated = true,
            Self::Text(c) => c.updated = true,
            Self::Chat(c) => c.updated = true,
            Self::Health(c) => c.updated = true,
            Self::Inventory(c) => c.updated = true,
            Self::Score(c) => c.updated = true,
            Self::Team(c) => c.updated = true,
            Self::ProximityPrompt(c) => c.updated = true,
            Self::Size(c) => c.updated = true,
            Self::Input(_) | Self::PhysicsBody(_) | Self::SpawnPosition(_) => {}
        }
    }

    /// Clear the dirty flag. Called only by the network sync layer, after a
    /// flush.
    pub fn clear_dirty(&mut self) {
        match self {
            Self::Position(c) => c.updated = false,
            Self::Rotation(c) => c.updated = false,
            Self::Color(c) => c.updated = false,
            Self::Player(c) => c.updated = false,
            Self::Text(c) => c.updated = false,
            Self::Chat(c) => c.updated = false,
            Self::Health(c) => c.updated = false,
            Self::Inventory(c) => c.updated = false,
            Self::Score(c) => c.updated = false,
            Self::Team(c) => c.updated = false,
            Self::ProximityPrompt(c) => c.updated = false,
            Self::Size(c) => c.updated = false,
            Self::Input(_) | Self::PhysicsBody(_) | Self::SpawnPosition(_) => {}
        }
    }

    /// Snapshot the current state as a wire record, or `None` for
    /// server-only kinds.
    #[must_use]
    pub fn to_wire(&self) -> Option<WireComponent> {
        match self {
            Self::Position(c) => Some(WireComponent::Position(*c)),
            Self::Rotation(c) => Some(WireComponent::Rotation(*c)),
            Self::Color(c) => Some(WireComponent::Color(c.clone())),
            Self::Player(c) => Some(WireComponent::Player(c.clone())),
            Self::Text(c) => Some(WireComponent::Text(c.clone())),
            Self::Chat(c) => Some(WireComponent::Chat(c.clone())),
            Self::Health(c) => Some(WireComponent::Health(c.clone())),
            Self::Inventory(c) => Some(WireComponent::Inventory(c.clone())),
            Self::Score(c) => Some(WireComponent::Score(c.clone())),
            Self::Team(c) => Some(WireComponent::Team(c.clone())),
            Self::ProximityPrompt(c) => Some(WireComponent::ProximityPrompt(c.clone())),
            Self::Size(c) => Some(WireComponent::Size(*c)),
            Self::Input(_) | Self::PhysicsBody(_) | Self::SpawnPosition(_) => None,
        }
    }
}

impl From<Position> for Component {
    fn from(c: Position) -> Self {
        Self::Position(c)
    }
}
impl From<Rotation> for Component {
    fn from(c: Rotation) -> Self {
        Self::Rotation(c)
    }
}
impl From<ColorTint> for Component {
    fn from(c: ColorTint) -> Self {
        Self::Color(c)
    }
}
impl From<Player> for Component {
    fn from(c: Player) -> Self {
        Self::Player(c)
    }
}
impl From<Text> for Component {
    fn from(c: Text) -> Self {
        Self::Text(c)
    }
}
impl From<Chat> for Component {
    fn from(c: Chat) -> Self {
        Self::Chat(c)
    }
}
impl From<Health> for Component {
    fn from(c: Health) -> Self {
        Self::Health(c)
    }
}
impl From<Inventory> for Component {
    fn from(c: Inventory) -> Self {
        Self::Inventory(c)
    }
}
impl From<Score> for Component {
    fn from(c: Score) -> Self {
        Self::Score(c)
    }
}
impl From<Team> for Component {
    fn from(c: Team) -> Self {
        Self::Team(c)
    }
}
impl From<ProximityPrompt> for Component {
    fn from(c: ProximityPrompt) -> Self {
        Self::ProximityPrompt(c)
    }
}
impl From<Size> for Component {
    fn from(c: Size) -> Self {
        Self::Size(c)
    }
}
impl From<Input> for Component {
    fn from(c: Input) -> Self {
        Self::Input(c)
    }
}
impl From<PhysicsBody> for Component {
    fn from(c: PhysicsBody) -> Self {
        Self::PhysicsBody(c)
    }
}
impl From<SpawnPosition> for Component {
    fn from(c: SpawnPosition) -> Self {
        Self::SpawnPosition(c)
    }
}

/// The serialized form of a network-visible component. Exactly the subset of
/// [`Component`] where [`ComponentKind::is_network`] holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WireComponent {
    Position(Position),
    Rotation(Rotation),
    Color(ColorTint),
    Player(Player),
    Text(Text),
    Chat(Chat),
    Health(Health),
    Inventory(Inventory),
    Score(Score),
    Team(Team),
    ProximityPrompt(ProximityPrompt),
    Size(Size),
}

impl WireComponent {
    /// The kind of the wrapped component.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Position(_) => ComponentKind::Position,
            Self::Rotation(_) => ComponentKind::Rotation,
            Self::Color(_) => ComponentKind::Color,
            Self::Player(_) => ComponentKind::Player,
            Self::Text(_) => ComponentKind::Text,
            Self::Chat(_) => ComponentKind::Chat,
            Self::Health(_) => ComponentKind::Health,
            Self::Inventory(_) => ComponentKind::Inventory,
            Self::Score(_) => ComponentKind::Score,
            Self::Team(_) => ComponentKind::Team,
            Self::ProximityPrompt(_) => ComponentKind::ProximityPrompt,
            Self::Size(_) => ComponentKind::Size,
        }
    }
}
