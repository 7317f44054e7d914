//! The set of all shopping lists on this device.

use crate::list::{ListId, ShoppingList};
use serde::{Deserialize, Serialize};

/// All shopping lists, keyed by id.
///
/// Lists are held in insertion order, which is also the persisted order.
/// Presentation order comes from [`ListCollection::sorted_newest_first`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListCollection {
    lists: Vec<ShoppingList>,
}

impl ListCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lists(lists: Vec<ShoppingList>) -> Self {
        ListCollection { lists }
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShoppingList> {
        self.lists.iter()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&ShoppingList> {
        self.lists.iter().find(|l| l.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ShoppingList> {
        self.lists.iter_mut().find(|l| l.id() == id)
    }

    /// Create an empty list named `name`.
    ///
    /// Returns `None` (and creates nothing) when the name is blank after
    /// trimming. The name is stored as given.
    pub fn create_list(&mut self, name: &str) -> Option<ListId> {
        if name.trim().is_empty() {
            debug!("create_list: rejected blank name");
            return None;
        }
        let list = ShoppingList::new(name);
        let id = list.id().to_string();
        self.lists.push(list);
        Some(id)
    }

    /// Replace the stored list that has the same id as `list`.
    ///
    /// Returns `false` (and stores nothing) when no list has that id.
    pub fn update_list(&mut self, list: ShoppingList) -> bool {
        match self.get_mut(list.id()) {
            Some(slot) => {
                *slot = list;
                true
            }
            None => {
                warn!("update_list: no list {}", list.id());
                false
            }
        }
    }

    /// Delete a list permanently. Returns whether it existed.
    pub fn delete_list(&mut self, id: &str) -> bool {
        let before = self.lists.len();
        self.lists.retain(|l| l.id() != id);
        self.lists.len() != before
    }

    /// Lists ordered by creation time, newest first.
    pub fn sorted_newest_first(&self) -> Vec<&ShoppingList> {
        let mut sorted: Vec<&ShoppingList> = self.lists.iter().collect();
        sorted.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_list() {
        let mut lists = ListCollection::new();
        let id = lists.create_list("Market").expect("name is not blank");

        assert_eq!(lists.len(), 1);
        let list = lists.get(&id).unwrap();
        assert_eq!(list.name(), "Market");
        assert!(list.is_empty());
    }

    #[test]
    fn test_create_list_rejects_blank_name() {
        let mut lists = ListCollection::new();
        assert!(lists.create_list("").is_none());
        assert!(lists.create_list("   \t").is_none());
        assert!(lists.is_empty());
    }

    #[test]
    fn test_create_list_keeps_name_verbatim() {
        let mut lists = ListCollection::new();
        let id = lists.create_list("  Corner shop ").unwrap();
        assert_eq!(lists.get(&id).unwrap().name(), "  Corner shop ");
    }

    #[test]
    fn test_update_list_replaces_by_id() {
        let mut lists = ListCollection::new();
        let a = lists.create_list("A").unwrap();
        let b = lists.create_list("B").unwrap();

        let mut edited = lists.get(&a).unwrap().clone();
        edited.rename("A2");
        assert!(lists.update_list(edited));

        assert_eq!(lists.get(&a).unwrap().name(), "A2");
        assert_eq!(lists.get(&b).unwrap().name(), "B");
    }

    #[test]
    fn test_update_unknown_list() {
        let mut lists = ListCollection::new();
        lists.create_list("A");
        assert!(!lists.update_list(ShoppingList::new("stray")));
        assert_eq!(lists.len(), 1);
    }

    #[test]
    fn test_delete_list() {
        let mut lists = ListCollection::new();
        let a = lists.create_list("A").unwrap();
        assert!(lists.delete_list(&a));
        assert!(!lists.delete_list(&a));
        assert!(lists.is_empty());
    }

    #[test]
    fn test_sorted_newest_first() {
        let older: ShoppingList =
            serde_json::from_str(r#"{"id": "old", "name": "Old", "createdAt": 100, "updatedAt": 100}"#)
                .unwrap();
        let newer: ShoppingList =
            serde_json::from_str(r#"{"id": "new", "name": "New", "createdAt": 200, "updatedAt": 200}"#)
                .unwrap();
        let lists = ListCollection::from_lists(vec![older, newer]);

        let ids: Vec<&str> = lists.sorted_newest_first().iter().map(|l| l.id()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn test_serializes_as_array() {
        let mut lists = ListCollection::new();
        lists.create_list("A");
        let value = serde_json::to_value(&lists).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["name"], "A");
    }
}
