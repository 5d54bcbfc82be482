//! Route definitions for the job creation wizard.
//!
//! Mounted at `/jobs` by `api_routes()`.
//!
//! ```text
//! POST   /                     create_job (employer)
//! GET    /                     list_jobs (employer; ?status, limit, offset)
//! GET    /published            list_published_jobs
//! GET    /{id}                 get_job
//! PUT    /{id}/steps/{step}    save_step
//! POST   /{id}/publish         publish_job
//! PUT    /{id}/status          update_job_status
//! ```

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(jobs::list_jobs).post(jobs::create_job))
        .route("/published", get(jobs::list_published_jobs))
        .route("/{id}", get(jobs::get_job))
        .route("/{id}/steps/{step}", put(jobs::save_step))
        .route("/{id}/publish", post(jobs::publish_job))
        .route("/{id}/status", put(jobs::update_job_status))
}
