use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::Store;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the store and config are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The page store, opened once at startup.
    pub store: Store,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Store, config: ServerConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
