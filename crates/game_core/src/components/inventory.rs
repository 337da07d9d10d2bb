//! Slot-based inventory for any entity that holds items: players, chests,
//! vendor NPCs.

use serde::{Deserialize, Serialize};

/// One item stack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Item type identifier (e.g. `"sword"`, `"health_potion"`). Stacks are
    /// keyed by this id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Stack size.
    pub quantity: u32,
    /// Optional icon URL or emoji.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Arbitrary game-specific data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Item {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity,
            icon: None,
            metadata: None,
        }
    }
}

/// A bounded set of item stacks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Inventory {
    pub items: Vec<Item>,
    /// Maximum number of distinct stacks.
    pub max_slots: usize,
    /// Dirty flag — pending broadcast.
    #[serde(skip)]
    pub updated: bool,
}

impl Inventory {
    #[must_use]
    pub fn new(max_slots: usize) -> Self {
        Self {
            items: Vec::new(),
            max_slots,
            updated: true,
        }
    }

    /// Add an item, stacking onto an existing slot with the same id first.
    /// Returns `false` when the item needs a new slot and the inventory is
    /// full.
    pub fn add_item(&mut self, item: Item) -> bool {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity += item.quantity;
            self.updated = true;
            return true;
        }
        if self.items.len() >= self.max_slots {
            return false;
        }
        self.items.push(item);
        self.updated = true;
        true
    }

    /// Remove `quantity` of an item by id. Returns `false` when the item is
    /// missing or the stack is too small. Emptied stacks free their slot.
    pub fn remove_item(&mut self, item_id: &str, quantity: u32) -> bool {
        let Some(index) = self.items.iter().position(|i| i.id == item_id) else {
            return false;
        };
        if self.items[index].quantity < quantity {
            return false;
        }
        self.items[index].quantity -= quantity;
        if self.items[index].quantity == 0 {
            self.items.remove(index);
        }
        self.updated = true;
        true
    }

    /// Whether the inventory holds at least `quantity` of an item.
    #[must_use]
    pub fn has_item(&self, item_id: &str, quantity: u32) -> bool {
        self.items
            .iter()
            .any(|i| i.id == item_id && i.quantity >= quantity)
    }
}
