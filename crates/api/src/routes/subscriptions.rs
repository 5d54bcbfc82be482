use axum::routing::post;
use axum::Router;

use crate::handlers::subscriptions;
use crate::state::AppState;

/// Routes mounted at `/subscriptions`.
pub fn router() -> Router<AppState> {
    Router::new().route("/verify", post(subscriptions::verify_checkout))
}
