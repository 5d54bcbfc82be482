pub mod auth;
pub mod health;
pub mod jobs;
pub mod profile;
pub mod subscriptions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth            signup, login, refresh, logout, me
/// /profile         profile projection, patch, onboarding steps
/// /jobs            job wizard, publish, status
/// /subscriptions   checkout verification
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/profile", profile::router())
        .nest("/jobs", jobs::router())
        .nest("/subscriptions", subscriptions::router())
}
