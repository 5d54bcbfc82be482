use std::sync::Arc;

use headhuntd_core::checkout::CheckoutVerifier;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or already a handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: headhuntd_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Payment provider client; `None` when no provider is configured.
    pub checkout: Option<Arc<dyn CheckoutVerifier>>,
}
