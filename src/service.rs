//! High-level tracker service.
//!
//! Owns the application state and the persistence gateway, and writes the
//! affected keys back after every action that changed them.

use crate::backend::{AnyBackend, StorageBackend};
use crate::config::{open_backend, StoreConfig};
use crate::error::Result;
use crate::persistence::PersistenceGateway;
use crate::state::{Action, AppState, Applied, Theme};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Tracker state plus storage, cheap to clone and share between tasks.
///
/// Actions are applied one at a time; the lock is held across the save so
/// storage always receives writes in the order the actions happened.
///
/// # Example
///
/// ```no_run
/// use grocertrack::backend::InMemoryBackend;
/// use grocertrack::persistence::PersistenceGateway;
/// use grocertrack::service::GroceryService;
/// use grocertrack::state::Action;
///
/// #[tokio::main]
/// async fn main() {
///     let gateway = PersistenceGateway::new(InMemoryBackend::new());
///     let service = GroceryService::load(gateway, false).await;
///
///     let applied = service
///         .dispatch(Action::CreateList { name: "Weekend market".into() })
///         .await;
///     assert!(applied.lists_changed);
/// }
/// ```
#[derive(Clone)]
pub struct GroceryService<B: StorageBackend> {
    state: Arc<Mutex<AppState>>,
    gateway: Arc<PersistenceGateway<B>>,
}

impl<B: StorageBackend> GroceryService<B> {
    /// Load persisted lists and theme.
    ///
    /// Without a stored theme, `prefers_dark` (the platform's colour scheme
    /// preference) decides. That fallback is not written back until the
    /// user changes the theme.
    pub async fn load(gateway: PersistenceGateway<B>, prefers_dark: bool) -> Self {
        let lists = gateway.load_lists().await;
        let theme = match gateway.load_theme().await {
            Some(theme) => theme,
            None => Theme::from_system(prefers_dark),
        };
        info!("Loaded {} lists (theme {})", lists.len(), theme);

        GroceryService {
            state: Arc::new(Mutex::new(AppState::new(lists, theme))),
            gateway: Arc::new(gateway),
        }
    }

    /// Apply an action and persist whatever it changed.
    ///
    /// Storage failures are logged and otherwise ignored: the in-memory state
    /// keeps the change and the next successful save carries it.
    pub async fn dispatch(&self, action: Action) -> Applied {
        let mut state = self.state.lock().await;
        let applied = state.apply(action);

        if applied.lists_changed {
            if let Err(e) = self.gateway.save_lists(state.lists()).await {
                warn!("Lists kept in memory only: {}", e);
            }
        }
        if applied.theme_changed {
            if let Err(e) = self.gateway.save_theme(state.theme()).await {
                warn!("Theme kept in memory only: {}", e);
            }
        }

        applied
    }

    /// Copy of the current state for rendering.
    ///
    /// A detail view whose list has been deleted is resolved to the listing.
    pub async fn snapshot(&self) -> AppState {
        let mut state = self.state.lock().await;
        state.resolve_view();
        state.clone()
    }

    pub async fn theme(&self) -> Theme {
        self.state.lock().await.theme()
    }

    /// Get a reference to the underlying gateway.
    pub fn gateway(&self) -> &PersistenceGateway<B> {
        &self.gateway
    }
}

impl GroceryService<AnyBackend> {
    /// Open storage as configured by the environment and load from it.
    ///
    /// # Errors
    ///
    /// `Error::ConfigError` when the environment names an unusable backend.
    pub async fn open_from_env(prefers_dark: bool) -> Result<Self> {
        let config = StoreConfig::from_env()?;
        Self::open(config, prefers_dark).await
    }

    /// Open storage described by `config` and load from it.
    ///
    /// # Errors
    ///
    /// `Error::ConfigError` when the configuration is invalid.
    pub async fn open(config: StoreConfig, prefers_dark: bool) -> Result<Self> {
        let backend = open_backend(&config)?;
        let gateway = PersistenceGateway::new(backend).with_config(config);
        Ok(Self::load(gateway, prefers_dark).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::reconcile::NumericField;
    use crate::state::ActiveView;

    async fn service() -> (InMemoryBackend, GroceryService<InMemoryBackend>) {
        let backend = InMemoryBackend::new();
        let service = GroceryService::load(PersistenceGateway::new(backend.clone()), false).await;
        (backend, service)
    }

    #[tokio::test]
    async fn test_fresh_service_is_empty() {
        let (backend, service) = service().await;
        let state = service.snapshot().await;
        assert!(state.lists().is_empty());
        assert_eq!(state.theme(), Theme::Light);
        assert_eq!(state.view(), &ActiveView::Listing);
        // System fallback is not persisted.
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_system_preference_used_without_stored_theme() {
        let gateway = PersistenceGateway::new(InMemoryBackend::new());
        let service = GroceryService::load(gateway, true).await;
        assert_eq!(service.theme().await, Theme::Dark);
    }

    #[tokio::test]
    async fn test_stored_theme_beats_system_preference() {
        let backend = InMemoryBackend::new();
        backend
            .set("grocertrack_theme", "light".to_string())
            .await
            .unwrap();
        let service = GroceryService::load(PersistenceGateway::new(backend), true).await;
        assert_eq!(service.theme().await, Theme::Light);
    }

    #[tokio::test]
    async fn test_dispatch_persists_lists() {
        let (backend, service) = service().await;
        let applied = service
            .dispatch(Action::CreateList {
                name: "Market".into(),
            })
            .await;
        let list_id = applied.created.expect("list id");

        let stored = backend
            .get("grocertrack_data_v1")
            .await
            .unwrap()
            .expect("data saved");
        assert!(stored.contains(&list_id));
    }

    #[tokio::test]
    async fn test_reconcile_through_service() {
        let (_, service) = service().await;
        let list_id = service
            .dispatch(Action::CreateList { name: "M".into() })
            .await
            .created
            .unwrap();
        let item_id = service
            .dispatch(Action::AddItem {
                list_id: list_id.clone(),
            })
            .await
            .created
            .unwrap();

        for (field, text) in [(NumericField::PricePerUnit, "2.5"), (NumericField::Quantity, "4")] {
            service
                .dispatch(Action::SetField {
                    list_id: list_id.clone(),
                    item_id: item_id.clone(),
                    field,
                    text: text.into(),
                })
                .await;
        }
        let applied = service
            .dispatch(Action::Reconcile {
                list_id: list_id.clone(),
                item_id: item_id.clone(),
            })
            .await;
        assert!(applied.lists_changed);

        let state = service.snapshot().await;
        let item = state.lists().get(&list_id).unwrap().item(&item_id).unwrap();
        assert_eq!(item.total_paid(), "10");
    }

    #[tokio::test]
    async fn test_toggle_theme_persists() {
        let (backend, service) = service().await;
        service.dispatch(Action::ToggleTheme).await;
        assert_eq!(
            backend.get("grocertrack_theme").await.unwrap(),
            Some("dark".to_string())
        );
    }

    #[tokio::test]
    async fn test_service_clone_shares_state() {
        let (_, service) = service().await;
        let other = service.clone();
        other
            .dispatch(Action::CreateList { name: "Shared".into() })
            .await;
        assert_eq!(service.snapshot().await.lists().len(), 1);
    }

    #[tokio::test]
    async fn test_open_in_memory_from_config() {
        let service = GroceryService::open(StoreConfig::default(), false)
            .await
            .expect("Failed to open");
        assert!(service.snapshot().await.lists().is_empty());
    }
}
