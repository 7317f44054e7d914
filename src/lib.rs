//! # grocertrack
//!
//! Core of a grocery shopping tracker: shopping lists of line items, a
//! two-of-three price/quantity/total reconciler, and persistence to a local
//! key-value store.
//!
//! ## Features
//!
//! - **Reconciliation:** enter any two of price per unit, quantity and total
//!   paid and derive the third, rounded to three decimals
//! - **Forgiving input:** numeric fields keep the raw text the user typed
//! - **Local persistence:** lists and theme survive restarts; unreadable data
//!   degrades to an empty start instead of an error
//! - **Schema migration:** data written by older builds is upgraded on load
//! - **Pluggable storage:** in-memory and file backends, or your own
//!   [`StorageBackend`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use grocertrack::{Action, GroceryService, NumericField, PersistenceGateway};
//! use grocertrack::backend::InMemoryBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let gateway = PersistenceGateway::new(InMemoryBackend::new());
//!     let service = GroceryService::load(gateway, false).await;
//!
//!     let list_id = service
//!         .dispatch(Action::CreateList { name: "Saturday market".into() })
//!         .await
//!         .created
//!         .unwrap();
//!     let item_id = service
//!         .dispatch(Action::AddItem { list_id: list_id.clone() })
//!         .await
//!         .created
//!         .unwrap();
//!
//!     for (field, text) in [(NumericField::TotalPaid, "10"), (NumericField::Quantity, "4")] {
//!         service
//!             .dispatch(Action::SetField {
//!                 list_id: list_id.clone(),
//!                 item_id: item_id.clone(),
//!                 field,
//!                 text: text.into(),
//!             })
//!             .await;
//!     }
//!     service
//!         .dispatch(Action::Reconcile { list_id: list_id.clone(), item_id: item_id.clone() })
//!         .await;
//!
//!     let state = service.snapshot().await;
//!     let item = state.lists().get(&list_id).unwrap().item(&item_id).unwrap();
//!     assert_eq!(item.price_per_unit(), "2.5");
//! }
//! ```
//!
//! ## Storage
//!
//! Use [`config::StoreConfig::from_env`] (`GROCERTRACK_BACKEND`,
//! `GROCERTRACK_DATA_DIR`) or construct a backend directly. See
//! [`persistence`] for the stored layout.

#[macro_use]
extern crate log;

pub mod backend;
pub mod collection;
pub mod config;
pub mod error;
pub mod item;
pub mod list;
pub mod migration;
pub mod observability;
pub mod persistence;
pub mod reconcile;
pub mod service;
pub mod state;

// Re-exports for convenience
pub use backend::StorageBackend;
pub use collection::ListCollection;
pub use error::{Error, Result};
pub use item::{ItemPatch, LineItem, UnitKind};
pub use list::ShoppingList;
pub use persistence::PersistenceGateway;
pub use reconcile::{reconcile, NumericField, Outcome};
pub use service::GroceryService;
pub use state::{Action, ActiveView, AppState, Applied, Theme};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
