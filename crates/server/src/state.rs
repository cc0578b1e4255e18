//! Application state shared across handlers.

use std::sync::Arc;
use stockroom_core::config::AppConfig;
use stockroom_store::InventoryStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Inventory store.
    pub store: Arc<dyn InventoryStore>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: AppConfig, store: Arc<dyn InventoryStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}
