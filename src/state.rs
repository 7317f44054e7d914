//! Application state and the actions that mutate it.
//!
//! [`AppState`] is the single record the presentation layer reads from. Every
//! user interaction becomes an [`Action`] passed to [`AppState::apply`], which
//! runs to completion and reports what changed in an [`Applied`]. The caller
//! uses that report as its "state changed" hook (see
//! [`GroceryService`](crate::service::GroceryService), which persists on it).
//!
//! ```
//! use grocertrack::state::{Action, ActiveView, AppState};
//!
//! let mut state = AppState::default();
//! let applied = state.apply(Action::CreateList { name: "Market".into() });
//! assert!(applied.lists_changed);
//!
//! let id = applied.created.unwrap();
//! assert_eq!(state.view(), &ActiveView::Detail(id));
//! ```

use crate::collection::ListCollection;
use crate::item::{ItemId, ItemPatch};
use crate::list::{ListId, ShoppingList};
use crate::reconcile::{NumericField, Outcome};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which screen is showing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ActiveView {
    /// Browsing all lists.
    #[default]
    Listing,
    /// Editing one list.
    Detail(ListId),
}

/// Colour theme preference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Theme to use when nothing is stored: follow the system preference.
    pub fn from_system(prefers_dark: bool) -> Theme {
        if prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(crate::error::Error::Other(format!(
                "unknown theme: {}",
                other
            ))),
        }
    }
}

/// A discrete user interaction.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    CreateList {
        name: String,
    },
    SelectList {
        id: ListId,
    },
    Back,
    UpdateList(ShoppingList),
    DeleteList {
        id: ListId,
    },
    AddItem {
        list_id: ListId,
    },
    UpdateItem {
        list_id: ListId,
        item_id: ItemId,
        patch: ItemPatch,
    },
    RemoveItem {
        list_id: ListId,
        item_id: ItemId,
    },
    SetField {
        list_id: ListId,
        item_id: ItemId,
        field: NumericField,
        text: String,
    },
    Reconcile {
        list_id: ListId,
        item_id: ItemId,
    },
    SetTheme(Theme),
    ToggleTheme,
}

/// What an [`Action`] changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Applied {
    /// The list collection changed and should be persisted.
    pub lists_changed: bool,
    /// The theme changed and should be persisted.
    pub theme_changed: bool,
    /// Reconciliation result, for [`Action::Reconcile`] on an existing item.
    pub outcome: Option<Outcome>,
    /// Id of the list or item created by this action.
    pub created: Option<String>,
}

impl Applied {
    fn lists(changed: bool) -> Self {
        Applied {
            lists_changed: changed,
            ..Default::default()
        }
    }
}

/// Everything the presentation layer renders from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    lists: ListCollection,
    view: ActiveView,
    theme: Theme,
}

impl AppState {
    pub fn new(lists: ListCollection, theme: Theme) -> Self {
        AppState {
            lists,
            view: ActiveView::Listing,
            theme,
        }
    }

    pub fn lists(&self) -> &ListCollection {
        &self.lists
    }

    pub fn view(&self) -> &ActiveView {
        &self.view
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// The list being edited, if the detail view points at one that exists.
    pub fn active_list(&self) -> Option<&ShoppingList> {
        match &self.view {
            ActiveView::Detail(id) => self.lists.get(id),
            ActiveView::Listing => None,
        }
    }

    /// Current view, falling back to `Listing` when the detail view points
    /// at a list that no longer exists.
    pub fn resolve_view(&mut self) -> &ActiveView {
        if let ActiveView::Detail(id) = &self.view {
            if !self.lists.contains(id) {
                debug!("Active list {} is gone, returning to listing", id);
                self.view = ActiveView::Listing;
            }
        }
        &self.view
    }

    /// Create a list and open it. Blank names are refused.
    pub fn create_list(&mut self, name: &str) -> Option<ListId> {
        let id = self.lists.create_list(name)?;
        self.view = ActiveView::Detail(id.clone());
        Some(id)
    }

    /// Open a list. Unknown ids leave the user on the listing.
    pub fn select_list(&mut self, id: &str) -> bool {
        if self.lists.contains(id) {
            self.view = ActiveView::Detail(id.to_string());
            true
        } else {
            warn!("select_list: no list {}", id);
            self.view = ActiveView::Listing;
            false
        }
    }

    pub fn back(&mut self) {
        self.view = ActiveView::Listing;
    }

    pub fn update_list(&mut self, list: ShoppingList) -> bool {
        self.lists.update_list(list)
    }

    /// Delete a list. If it was open, return to the listing.
    pub fn delete_list(&mut self, id: &str) -> bool {
        let deleted = self.lists.delete_list(id);
        if matches!(&self.view, ActiveView::Detail(active) if active == id) {
            self.view = ActiveView::Listing;
        }
        deleted
    }

    pub fn add_item(&mut self, list_id: &str) -> Option<ItemId> {
        let list = self.list_mut(list_id)?;
        Some(list.add_item().id().to_string())
    }

    pub fn update_item(&mut self, list_id: &str, item_id: &str, patch: ItemPatch) -> bool {
        self.list_mut(list_id)
            .is_some_and(|list| list.update_item(item_id, patch))
    }

    pub fn remove_item(&mut self, list_id: &str, item_id: &str) -> bool {
        self.list_mut(list_id)
            .is_some_and(|list| list.remove_item(item_id))
    }

    pub fn set_field(
        &mut self,
        list_id: &str,
        item_id: &str,
        field: NumericField,
        text: &str,
    ) -> bool {
        self.list_mut(list_id)
            .is_some_and(|list| list.set_item_field(item_id, field, text))
    }

    pub fn trigger_reconcile(&mut self, list_id: &str, item_id: &str) -> Option<Outcome> {
        self.list_mut(list_id)?.reconcile_item(item_id)
    }

    /// Returns whether the theme actually changed.
    pub fn set_theme(&mut self, theme: Theme) -> bool {
        let changed = self.theme != theme;
        self.theme = theme;
        changed
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Run one action to completion.
    pub fn apply(&mut self, action: Action) -> Applied {
        match action {
            Action::CreateList { name } => match self.create_list(&name) {
                Some(id) => Applied {
                    lists_changed: true,
                    created: Some(id),
                    ..Default::default()
                },
                None => Applied::default(),
            },
            Action::SelectList { id } => {
                self.select_list(&id);
                Applied::default()
            }
            Action::Back => {
                self.back();
                Applied::default()
            }
            Action::UpdateList(list) => Applied::lists(self.update_list(list)),
            Action::DeleteList { id } => Applied::lists(self.delete_list(&id)),
            Action::AddItem { list_id } => match self.add_item(&list_id) {
                Some(item_id) => Applied {
                    lists_changed: true,
                    created: Some(item_id),
                    ..Default::default()
                },
                None => Applied::default(),
            },
            Action::UpdateItem {
                list_id,
                item_id,
                patch,
            } => Applied::lists(self.update_item(&list_id, &item_id, patch)),
            Action::RemoveItem { list_id, item_id } => {
                Applied::lists(self.remove_item(&list_id, &item_id))
            }
            Action::SetField {
                list_id,
                item_id,
                field,
                text,
            } => Applied::lists(self.set_field(&list_id, &item_id, field, &text)),
            Action::Reconcile { list_id, item_id } => {
                let outcome = self.trigger_reconcile(&list_id, &item_id);
                Applied {
                    lists_changed: outcome.as_ref().is_some_and(Outcome::is_derived),
                    outcome,
                    ..Default::default()
                }
            }
            Action::SetTheme(theme) => Applied {
                theme_changed: self.set_theme(theme),
                ..Default::default()
            },
            Action::ToggleTheme => {
                self.toggle_theme();
                Applied {
                    theme_changed: true,
                    ..Default::default()
                }
            }
        }
    }

    fn list_mut(&mut self, id: &str) -> Option<&mut ShoppingList> {
        let list = self.lists.get_mut(id);
        if list.is_none() {
            warn!("No list {}", id);
        }
        list
    }
}
