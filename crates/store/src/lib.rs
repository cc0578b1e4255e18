//! Inventory store abstraction and SQLite implementation for stockroom.
//!
//! This crate provides the persistence layer:
//! - Users, sessions, categories, and products as repository traits
//! - Find-or-create category resolution
//! - Schema bootstrap and migrations

pub mod error;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use repos::{CategoryFilter, resolve_category_id};
pub use store::{InventoryStore, SqliteStore};

use std::sync::Arc;
use stockroom_core::config::StoreConfig;

/// Create an inventory store from configuration.
pub async fn from_config(config: &StoreConfig) -> StoreResult<Arc<dyn InventoryStore>> {
    match config {
        StoreConfig::Sqlite { path } => {
            let store = SqliteStore::new(path).await?;
            Ok(Arc::new(store) as Arc<dyn InventoryStore>)
        }
    }
}
