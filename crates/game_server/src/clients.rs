//! Per-client connection state and the client registry.

use std::collections::HashMap;

use uuid::Uuid;

use game_core::entity::EntityId;
use game_net::channel::MessageChannel;

/// Unique identifier for one client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub Uuid);

impl ClientId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One connected client: its channel, its player entity, and the
/// rate-limiting state the inbound validators consult.
#[derive(Debug)]
pub struct Client {
    pub id: ClientId,
    pub channel: MessageChannel,
    /// The player entity owned by this connection.
    pub player: EntityId,
    /// False until the first flush has delivered the full world snapshot.
    pub initialized: bool,
    /// Server uptime of the last accepted chat message.
    pub last_chat: f64,
    /// Server uptime of the last accepted interaction, per prompt entity.
    pub last_interact: HashMap<EntityId, f64>,
}

impl Client {
    #[must_use]
    pub fn new(channel: MessageChannel, player: EntityId) -> Self {
        Self {
            id: ClientId::new(),
            channel,
            player,
            initialized: false,
            last_chat: f64::NEG_INFINITY,
            last_interact: HashMap::new(),
        }
    }
}

/// All connected clients, keyed by connection id.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<ClientId, Client>,
}

impl ClientRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    pub fn insert(&mut self, client: Client) -> ClientId {
        let id = client.id;
        self.clients.insert(id, client);
        id
    }

    /// Drop a client, returning it so the caller can tear down its player
    /// entity.
    pub fn remove(&mut self, id: ClientId) -> Option<Client> {
        self.clients.remove(&id)
    }

    #[must_use]
    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    #[must_use]
    pub fn get_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.clients.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Client> {
        self.clients.values_mut()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<ClientId> {
        self.clients.keys().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove() {
        let mut registry = ClientRegistry::new();
        let (server_end, _remote) = MessageChannel::pair();
        let id = registry.insert(Client::new(server_end, EntityId(1)));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(id).unwrap().player, EntityId(1));
        assert!(!registry.get(id).unwrap().initialized);

        let removed = registry.remove(id).unwrap();
        assert_eq!(removed.player, EntityId(1));
        assert!(registry.is_empty());
        assert!(registry.remove(id).is_none());
    }
}
