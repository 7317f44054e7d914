//! Shopping list aggregate.

use crate::item::{new_id, now_millis, ItemPatch, LineItem};
use crate::reconcile::{parse_number, NumericField, Outcome};
use serde::{Deserialize, Serialize};

/// Identifier of a shopping list.
pub type ListId = String;

/// A named shopping trip with its ordered line items.
///
/// `updated_at` moves forward on every mutation of the list or of any item
/// in it. Items keep insertion order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    id: ListId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    created_at: i64,
    #[serde(default)]
    updated_at: i64,
    #[serde(default)]
    items: Vec<LineItem>,
}

impl ShoppingList {
    /// New empty list. Both timestamps are set to now.
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_millis();
        ShoppingList {
            id: new_id(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            items: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id() == id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    /// Bump `updated_at`. Never moves it backwards.
    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at);
    }

    /// Append a blank item and return it.
    pub fn add_item(&mut self) -> &LineItem {
        self.items.push(LineItem::new());
        self.touch();
        &self.items[self.items.len() - 1]
    }

    /// Merge `patch` into the item with `id`.
    ///
    /// An unknown id leaves the list untouched. Returns whether an item matched.
    pub fn update_item(&mut self, id: &str, patch: ItemPatch) -> bool {
        let Some(item) = self.item_mut(id) else {
            warn!("update_item: no item {} in list {}", id, self.id);
            return false;
        };
        item.apply(patch);
        self.touch();
        true
    }

    /// Remove the item with `id`. Unknown ids are a no-op.
    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id() != id);
        if self.items.len() == before {
            return false;
        }
        self.touch();
        true
    }

    /// Field edit on one item; see [`LineItem::set_field`].
    ///
    /// Returns whether the edit was accepted (item found and text not negative).
    pub fn set_item_field(&mut self, id: &str, field: NumericField, text: &str) -> bool {
        let accepted = match self.item_mut(id) {
            Some(item) => item.set_field(field, text),
            None => false,
        };
        if accepted {
            self.touch();
        }
        accepted
    }

    /// Reconcile one item; see [`LineItem::trigger_reconcile`].
    ///
    /// Returns `None` for an unknown id.
    pub fn reconcile_item(&mut self, id: &str) -> Option<Outcome> {
        let outcome = self.item_mut(id)?.trigger_reconcile();
        if outcome.is_derived() {
            self.touch();
        }
        Some(outcome)
    }

    /// Sum of every item's total paid. Blank or non-numeric totals count as 0.
    pub fn subtotal(&self) -> f64 {
        self.items
            .iter()
            .map(|i| parse_number(i.total_paid()).unwrap_or(0.0))
            .sum()
    }

    fn item_mut(&mut self, id: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|i| i.id() == id)
    }
}
