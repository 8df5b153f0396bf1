use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: interpret_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Lifecycle events for the email notifier.
    pub event_bus: Arc<interpret_events::EventBus>,
}
