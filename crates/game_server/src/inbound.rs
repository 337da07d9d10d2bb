//! Inbound message dispatch and defensive validation.
//!
//! Every field of every client message is validated server-side: strings are
//! clamped to configured limits, numeric fields must be finite, and
//! interaction distance and cooldowns are enforced from server state. A
//! validation failure never mutates the world and never aborts the tick —
//! it surfaces only to the offending client.

use tracing::debug;

use game_core::component::ComponentKind;
use game_core::entity::EntityId;
use game_core::event::{EventSystem, GameEvent, MessageScope};
use game_core::manager::EntityManager;
use game_net::error::NetError;
use game_net::messages::ClientMessage;

use crate::clients::Client;
use crate::config::ServerConfig;

/// Longest accepted item id. Anything past this is a malformed client.
const MAX_ITEM_ID_LEN: usize = 64;

/// Trim surrounding whitespace and truncate to at most `max` characters.
fn clamp_chars(input: &str, max: usize) -> String {
    input.trim().chars().take(max).collect()
}

/// Apply one already-decoded client message.
///
/// # Errors
///
/// Returns [`NetError::Validation`] when the message fails a server-side
/// check; the world is left untouched in that case.
pub fn dispatch(
    client: &mut Client,
    message: ClientMessage,
    entities: &mut EntityManager,
    events: &mut EventSystem,
    config: &ServerConfig,
    chat_entity: EntityId,
    now: f64,
) -> Result<(), NetError> {
    match message {
        ClientMessage::Input {
            up,
            down,
            left,
            right,
            space,
            angle,
        } => {
            if !angle.is_finite() {
                return Err(NetError::Validation("non-finite input angle".into()));
            }
            let Some(entity) = entities.entity_mut(client.player) else {
                debug!(player = %client.player, "input for missing player entity");
                return Ok(());
            };
            if let Some(input) = entity.input_mut() {
                input.up = up;
                input.down = down;
                input.left = left;
                input.right = right;
                input.space = space;
                input.angle = angle;
            }
            Ok(())
        }

        ClientMessage::Chat { content } => {
            if now - client.last_chat < config.chat_cooldown {
                return Err(NetError::Validation("chatting too fast".into()));
            }
            let content = clamp_chars(&content, config.max_chat_len);
            if content.is_empty() {
                return Err(NetError::Validation("empty chat message".into()));
            }
            let author = entities
                .entity(client.player)
                .and_then(|e| e.player())
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "Player".to_string());

            let Some(chat) = entities
                .entity_mut(chat_entity)
                .and_then(|e| e.chat_mut())
            else {
                debug!(entity = %chat_entity, "chat entity missing, dropping message");
                return Ok(());
            };
            chat.add_message(author.clone(), content.clone());

            client.last_chat = now;
            events.add_event(GameEvent::ComponentUpdated {
                entity: chat_entity,
                kind: ComponentKind::Chat,
            });
            events.add_event(GameEvent::Message {
                entity: chat_entity,
                author,
                content,
                scope: MessageScope::GlobalChat,
                targets: Vec::new(),
            });
            Ok(())
        }

        ClientMessage::ProximityPromptInteract { target } => {
            let Some(target_entity) = entities.entity(target) else {
                // Stale id from a just-destroyed prompt. Recoverable.
                debug!(target = %target, "interact with unknown entity");
                return Ok(());
            };
            let Some(prompt) = target_entity.proximity_prompt() else {
                return Err(NetError::Validation("entity is not interactable".into()));
            };
            let max_distance = prompt.max_distance;
            let cooldown = f64::from(prompt.cooldown_ms) / 1000.0;

            // Distance is only enforceable when both sides are positioned;
            // anything less fails closed.
            let Some(prompt_pos) = target_entity.position().map(|p| p.coords) else {
                return Err(NetError::Validation("prompt has no position".into()));
            };
            let Some(player_pos) = entities
                .entity(client.player)
                .and_then(|e| e.position())
                .map(|p| p.coords)
            else {
                return Err(NetError::Validation("player has no position".into()));
            };
            if prompt_pos.distance(player_pos) > max_distance {
                return Err(NetError::Validation("too far away".into()));
            }

            let last = client.last_interact.get(&target).copied();
            if let Some(last) = last
                && now - last < cooldown
            {
                return Err(NetError::Validation("interaction on cooldown".into()));
            }
            client.last_interact.insert(target, now);

            events.add_event(GameEvent::ProximityInteract {
                prompt: target,
                player: client.player,
            });
            Ok(())
        }

        ClientMessage::SetPlayerName { name } => {
            let name = clamp_chars(&name, config.max_name_len);
            if name.is_empty() {
                return Err(NetError::Validation("empty player name".into()));
            }
            let Some(entity) = entities.entity_mut(client.player) else {
                debug!(player = %client.player, "rename for missing player entity");
                return Ok(());
            };
            if let Some(player) = entity.player_mut() {
                player.set_name(name.clone());
            }
            if let Some(text) = entity.text_mut() {
                text.set_text(name);
            }
            events.add_event(GameEvent::ComponentUpdated {
                entity: client.player,
                kind: ComponentKind::Player,
            });
            Ok(())
        }

        ClientMessage::UseItem { item_id } => {
            if item_id.len() > MAX_ITEM_ID_LEN {
                return Err(NetError::Validation("item id too long".into()));
            }
            let holds_item = entities
                .entity(client.player)
                .and_then(|e| e.inventory())
                .is_some_and(|inv| inv.has_item(&item_id, 1));
            if !holds_item {
                return Err(NetError::Validation("item not in inventory".into()));
            }
            events.add_event(GameEvent::ItemUsed {
                entity: client.player,
                item_id,
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::components::{
        Chat, Health, Input, Inventory, Item, Player, Position, ProximityPrompt, Text,
    };
    use game_core::event::EventKind;
    use game_net::channel::MessageChannel;

    struct Fixture {
        entities: EntityManager,
        events: EventSystem,
        config: ServerConfig,
        client: Client,
        chat_entity: EntityId,
    }

    fn fixture() -> Fixture {
        let mut entities = EntityManager::new();
        let mut events = EventSystem::new();

        let chat_entity = entities.create_entity();
        entities.add_component(chat_entity, Chat::new(20).into(), &mut events);

        let player = entities.create_entity();
        entities.add_component(player, Player::new("tester").into(), &mut events);
        entities.add_component(player, Text::new("tester", 2.0, 100.0).into(), &mut events);
        entities.add_component(player, Position::new(0.0, 0.0, 0.0).into(), &mut events);
        entities.add_component(player, Health::new(100, 100).into(), &mut events);
        entities.add_component(player, Inventory::new(4).into(), &mut events);
        entities.add_component(player, Input::default().into(), &mut events);
        events.clear();

        let (server_end, _remote) = MessageChannel::pair();
        Fixture {
            entities,
            events,
            config: ServerConfig::default(),
            client: Client::new(server_end, player),
            chat_entity,
        }
    }

    #[test]
    fn test_chat_content_truncated_to_limit() {
        let mut fx = fixture();
        let long = "x".repeat(500);

        dispatch(
            &mut fx.client,
            ClientMessage::Chat { content: long },
            &mut fx.entities,
            &mut fx.events,
            &fx.config,
            fx.chat_entity,
            10.0,
        )
        .unwrap();

        let chat = fx.entities.entity(fx.chat_entity).unwrap().chat().unwrap();
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.messages[0].content.chars().count(), 300);

        // The broadcast event carries the same truncated content.
        let GameEvent::Message { content, .. } = fx
            .events
            .events_of(EventKind::Message)
            .next()
            .unwrap()
        else {
            panic!("expected message event");
        };
        assert_eq!(content.chars().count(), 300);
    }

    #[test]
    fn test_chat_rate_limited() {
        let mut fx = fixture();
        let send = |fx: &mut Fixture, now: f64| {
            dispatch(
                &mut fx.client,
                ClientMessage::Chat {
                    content: "hi".into(),
                },
                &mut fx.entities,
                &mut fx.events,
                &fx.config,
                fx.chat_entity,
                now,
            )
        };
        assert!(send(&mut fx, 10.0).is_ok());
        assert!(matches!(
            send(&mut fx, 10.1),
            Err(NetError::Validation(_))
        ));
        assert!(send(&mut fx, 11.0).is_ok());
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let mut fx = fixture();
        let result = dispatch(
            &mut fx.client,
            ClientMessage::Input {
                up: true,
                down: false,
                left: false,
                right: false,
                space: false,
                angle: f32::NAN,
            },
            &mut fx.entities,
            &mut fx.events,
            &fx.config,
            fx.chat_entity,
            0.0,
        );
        assert!(matches!(result, Err(NetError::Validation(_))));
        // State untouched.
        let input = fx.entities.entity(fx.client.player).unwrap().input().unwrap();
        assert!(!input.up);
    }

    #[test]
    fn test_valid_input_stored() {
        let mut fx = fixture();
        dispatch(
            &mut fx.client,
            ClientMessage::Input {
                up: true,
                down: false,
                left: true,
                right: false,
                space: false,
                angle: 0.5,
            },
            &mut fx.entities,
            &mut fx.events,
            &fx.config,
            fx.chat_entity,
            0.0,
        )
        .unwrap();
        let input = fx.entities.entity(fx.client.player).unwrap().input().unwrap();
        assert!(input.up && input.left);
        assert!((input.angle - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_set_player_name_clamped() {
        let mut fx = fixture();
        dispatch(
            &mut fx.client,
            ClientMessage::SetPlayerName {
                name: "a".repeat(100),
            },
            &mut fx.entities,
            &mut fx.events,
            &fx.config,
            fx.chat_entity,
            0.0,
        )
        .unwrap();
        let entity = fx.entities.entity(fx.client.player).unwrap();
        assert_eq!(entity.player().unwrap().name.len(), 32);
        assert_eq!(entity.text().unwrap().text.len(), 32);
    }

    #[test]
    fn test_interact_enforces_distance_and_cooldown() {
        let mut fx = fixture();
        let prompt = fx.entities.create_entity();
        fx.entities.add_component(
            prompt,
            Position::new(100.0, 0.0, 0.0).into(),
            &mut fx.events,
        );
        fx.entities.add_component(
            prompt,
            ProximityPrompt::new("Open", 10.0, 2000).into(),
            &mut fx.events,
        );
        fx.events.clear();

        let interact = |fx: &mut Fixture, now: f64| {
            dispatch(
                &mut fx.client,
                ClientMessage::ProximityPromptInteract { target: prompt },
                &mut fx.entities,
                &mut fx.events,
                &fx.config,
                fx.chat_entity,
                now,
            )
        };

        // Player at origin, prompt 100 units away: too far.
        assert!(matches!(interact(&mut fx, 0.0), Err(NetError::Validation(_))));

        // Move within range.
        fx.entities
            .entity_mut(fx.client.player)
            .unwrap()
            .position_mut()
            .unwrap()
            .set(glam::Vec3::new(95.0, 0.0, 0.0));
        assert!(interact(&mut fx, 1.0).is_ok());

        // Cooldown (2s) still running.
        assert!(matches!(interact(&mut fx, 2.0), Err(NetError::Validation(_))));
        assert!(interact(&mut fx, 3.5).is_ok());

        assert_eq!(fx.events.events_of(EventKind::ProximityInteract).count(), 2);
    }

    #[test]
    fn test_interact_with_unpositioned_prompt_rejected() {
        let mut fx = fixture();
        // A prompt with no position cannot have its distance enforced.
        let prompt = fx.entities.create_entity();
        fx.entities.add_component(
            prompt,
            ProximityPrompt::new("Open", 10.0, 0).into(),
            &mut fx.events,
        );
        fx.events.clear();

        let result = dispatch(
            &mut fx.client,
            ClientMessage::ProximityPromptInteract { target: prompt },
            &mut fx.entities,
            &mut fx.events,
            &fx.config,
            fx.chat_entity,
            0.0,
        );
        assert!(matches!(result, Err(NetError::Validation(_))));
        assert_eq!(fx.events.events_of(EventKind::ProximityInteract).count(), 0);
    }

    #[test]
    fn test_interact_with_unknown_entity_is_noop() {
        let mut fx = fixture();
        let result = dispatch(
            &mut fx.client,
            ClientMessage::ProximityPromptInteract {
                target: EntityId::from_raw(9999),
            },
            &mut fx.entities,
            &mut fx.events,
            &fx.config,
            fx.chat_entity,
            0.0,
        );
        assert!(result.is_ok());
        assert!(fx.events.is_empty());
    }

    #[test]
    fn test_use_item_requires_possession() {
        let mut fx = fixture();
        let use_item = |fx: &mut Fixture| {
            dispatch(
                &mut fx.client,
                ClientMessage::UseItem {
                    item_id: "potion".into(),
                },
                &mut fx.entities,
                &mut fx.events,
                &fx.config,
                fx.chat_entity,
                0.0,
            )
        };
        assert!(matches!(use_item(&mut fx), Err(NetError::Validation(_))));

        fx.entities
            .entity_mut(fx.client.player)
            .unwrap()
            .inventory_mut()
            .unwrap()
            .add_item(Item::new("potion", "Potion", 1));
        assert!(use_item(&mut fx).is_ok());
        assert_eq!(fx.events.events_of(EventKind::ItemUsed).count(), 1);
    }
}
