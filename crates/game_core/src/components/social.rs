//! Player-facing components: identity tags, floating text, chat backlog,
//! color tint, and proximity prompts.

use serde::{Deserialize, Serialize};

/// Tags an entity as a connected player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    /// Display name, server-clamped on change.
    pub name: String,
    /// Dirty flag — pending broadcast.
    #[serde(skip)]
    pub updated: bool,
}

impl Player {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            updated: true,
        }
    }

    /// Rename the player. The caller is responsible for clamping.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated = true;
    }
}

/// Floating text label rendered above an entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Text {
    pub text: String,
    /// Vertical offset above the entity origin, in world units.
    pub offset_y: f32,
    /// Maximum camera distance at which the label is shown.
    pub display_distance: f32,
    /// Dirty flag — pending broadcast.
    #[serde(skip)]
    pub updated: bool,
}

impl Text {
    #[must_use]
    pub fn new(text: impl Into<String>, offset_y: f32, display_distance: f32) -> Self {
        Self {
            text: text.into(),
            offset_y,
            display_distance,
            updated: true,
        }
    }

    /// Replace the label text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.updated = true;
    }
}

/// One chat backlog entry. Targeted messages never land here — they travel
/// as per-client event records instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatEntry {
    pub author: String,
    pub content: String,
}

/// Global chat backlog, held by a dedicated chat entity created at server
/// startup. Bounded: the oldest entry is dropped past `max_messages`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chat {
    pub messages: Vec<ChatEntry>,
    pub max_messages: usize,
    /// Dirty flag — pending broadcast.
    #[serde(skip)]
    pub updated: bool,
}

impl Chat {
    #[must_use]
    pub fn new(max_messages: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_messages,
            updated: true,
        }
    }

    /// Append a message, evicting the oldest entry when the backlog is full.
    pub fn add_message(&mut self, author: impl Into<String>, content: impl Into<String>) {
        self.messages.push(ChatEntry {
            author: author.into(),
            content: content.into(),
        });
        if self.messages.len() > self.max_messages {
            self.messages.remove(0);
        }
        self.updated = true;
    }
}

/// Tint color applied to an entity's mesh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColorTint {
    /// Hex color string, e.g. `"#3c9cf0"`.
    pub color: String,
    /// Dirty flag — pending broadcast.
    #[serde(skip)]
    pub updated: bool,
}

impl ColorTint {
    #[must_use]
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            updated: true,
        }
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
        self.updated = true;
    }
}

/// An interactable prompt shown to nearby players ("press E to open").
/// Interaction distance and cooldown are enforced server-side on the
/// inbound message, not trusted from the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProximityPrompt {
    /// Prompt label shown to the player.
    pub text: String,
    /// Maximum interaction distance in world units.
    pub max_distance: f32,
    /// How long the client must hold the key, in milliseconds.
    pub hold_ms: u32,
    /// Per-player cooldown between accepted interactions, in milliseconds.
    pub cooldown_ms: u32,
    /// Dirty flag — pending broadcast.
    #[serde(skip)]
    pub updated: bool,
}

impl ProximityPrompt {
    #[must_use]
    pub fn new(text: impl Into<String>, max_distance: f32, cooldown_ms: u32) -> Self {
        Self {
            text: text.into(),
            max_distance,
            hold_ms: 0,
            cooldown_ms,
            updated: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_backlog_is_bounded() {
        let mut chat = Chat::new(3);
        for i in 0..5 {
            chat.add_message("bot", format!("msg {i}"));
        }
        assert_eq!(chat.messages.len(), 3);
        assert_eq!(chat.messages[0].content, "msg 2");
        assert_eq!(chat.messages[2].content, "msg 4");
    }

    #[test]
    fn test_set_name_marks_dirty() {
        let mut player = Player::new("guest");
        player.updated = false;
        player.set_name("neo");
        assert!(player.updated);
        assert_eq!(player.name, "neo");
    }

    #[test]
    fn test_text_update() {
        let mut text = Text::new("0 - 0", 2.0, 200.0);
        text.updated = false;
        text.set_text("1 - 0");
        assert!(text.updated);
    }
}
