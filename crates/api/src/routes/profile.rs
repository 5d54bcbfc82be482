//! Route definitions for the caller's profile.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::profile;
use crate::state::AppState;

/// Routes mounted at `/profile`.
///
/// ```text
/// GET   /                     get_profile
/// PATCH /                     update_profile
/// PUT   /onboarding/{step}    save_onboarding_step
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(profile::get_profile).patch(profile::update_profile),
        )
        .route("/onboarding/{step}", put(profile::save_onboarding_step))
}
