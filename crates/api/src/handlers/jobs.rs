//! Handlers for the job creation wizard.
//!
//! An employer creates an empty draft, saves the four steps in any order,
//! publishes once every step is complete, and later closes or fills the
//! posting. Every id-based handler resolves the job through
//! [`load_owned_job`], so a job owned by someone else is indistinguishable
//! from one that does not exist.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use headhuntd_core::error::CoreError;
use headhuntd_core::job_draft::{DraftProgress, JobStatus, JobStep, ENTITY_JOB};
use headhuntd_core::job_steps::JobStepPayload;
use headhuntd_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use headhuntd_core::types::DbId;
use headhuntd_db::models::job::{Job, JobResponse};
use headhuntd_db::repositories::JobRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireEmployer;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListJobsParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: JobStatus,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a job and check that `actor_id` owns it.
async fn load_owned_job(pool: &sqlx::PgPool, id: DbId, actor_id: DbId) -> AppResult<Job> {
    let job = JobRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: ENTITY_JOB,
            id,
        }))?;
    job.to_draft()?.ensure_owned_by(actor_id)?;
    Ok(job)
}

fn to_responses(jobs: &[Job]) -> AppResult<Vec<JobResponse>> {
    jobs.iter()
        .map(|j| JobResponse::try_from(j).map_err(AppError::from))
        .collect()
}

/// A guarded write matched no row although the read-side checks passed:
/// the job changed in between.
fn concurrent_change(id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "Job {id} was modified concurrently; reload and try again"
    )))
}

// ---------------------------------------------------------------------------
// POST /jobs
// ---------------------------------------------------------------------------

/// Create an empty draft owned by the calling employer.
pub async fn create_job(
    State(state): State<AppState>,
    RequireEmployer(auth): RequireEmployer,
) -> AppResult<impl IntoResponse> {
    let job = JobRepo::create(&state.pool, auth.user_id).await?;

    tracing::info!(job_id = job.id, owner_id = auth.user_id, "Job draft created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: JobResponse::try_from(&job)?,
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /jobs
// ---------------------------------------------------------------------------

/// List the calling employer's jobs (`?status=&limit=&offset=`).
pub async fn list_jobs(
    State(state): State<AppState>,
    RequireEmployer(auth): RequireEmployer,
    AppQuery(params): AppQuery<ListJobsParams>,
) -> AppResult<impl IntoResponse> {
    let status = params
        .status
        .as_deref()
        .map(JobStatus::from_str_db)
        .transpose()?;
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let jobs = JobRepo::list_by_owner(&state.pool, auth.user_id, status, limit, offset).await?;
    Ok(Json(DataResponse {
        data: to_responses(&jobs)?,
    }))
}

// ---------------------------------------------------------------------------
// GET /jobs/published
// ---------------------------------------------------------------------------

/// List published jobs across all employers.
pub async fn list_published_jobs(
    State(state): State<AppState>,
    _auth: AuthUser,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let jobs = JobRepo::list_published(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse {
        data: to_responses(&jobs)?,
    }))
}

// ---------------------------------------------------------------------------
// GET /jobs/{id}
// ---------------------------------------------------------------------------

/// Resume a draft: every saved step, flags and progress.
pub async fn get_job(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let job = load_owned_job(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: JobResponse::try_from(&job)?,
    }))
}

// ---------------------------------------------------------------------------
// PUT /jobs/{id}/steps/{step}
// ---------------------------------------------------------------------------

/// Validate and save one wizard step, replacing whatever was saved before.
pub async fn save_step(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((id, step_name)): AppPath<(DbId, String)>,
    AppJson(raw): AppJson<serde_json::Value>,
) -> AppResult<impl IntoResponse> {
    let step = JobStep::parse(&step_name)?;
    let job = load_owned_job(&state.pool, id, auth.user_id).await?;

    let payload = JobStepPayload::parse(step, raw, Utc::now().date_naive())?;

    // Status and ownership rules, checked on the in-memory aggregate.
    let mut draft = job.to_draft()?;
    draft.apply_step(auth.user_id, payload.clone())?;

    let updated = JobRepo::save_step(&state.pool, id, auth.user_id, &payload)
        .await?
        .ok_or_else(|| concurrent_change(id))?;

    let progress = DraftProgress::from_flags(updated.flags());
    tracing::info!(
        job_id = id,
        step = step.as_str(),
        completion = progress.completion_percentage,
        "Job step saved"
    );

    Ok(Json(DataResponse { data: progress }))
}

// ---------------------------------------------------------------------------
// POST /jobs/{id}/publish
// ---------------------------------------------------------------------------

/// Publish a complete draft. Publishing an already-published job returns it
/// unchanged.
pub async fn publish_job(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let job = load_owned_job(&state.pool, id, auth.user_id).await?;

    if !job.to_draft()?.check_publishable(auth.user_id)? {
        return Ok(Json(DataResponse {
            data: JobResponse::try_from(&job)?,
        }));
    }

    let published = JobRepo::publish(&state.pool, id, auth.user_id, Utc::now())
        .await?
        .ok_or_else(|| concurrent_change(id))?;

    tracing::info!(job_id = id, owner_id = auth.user_id, "Job published");

    Ok(Json(DataResponse {
        data: JobResponse::try_from(&published)?,
    }))
}

// ---------------------------------------------------------------------------
// PUT /jobs/{id}/status
// ---------------------------------------------------------------------------

/// Close or fill a published job.
pub async fn update_job_status(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
    AppJson(body): AppJson<UpdateStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let job = load_owned_job(&state.pool, id, auth.user_id).await?;
    let mut draft = job.to_draft()?;
    let from = draft.status;
    draft.set_status(auth.user_id, body.status)?;

    let updated = JobRepo::update_status(&state.pool, id, auth.user_id, from, body.status)
        .await?
        .ok_or_else(|| concurrent_change(id))?;

    tracing::info!(
        job_id = id,
        from = from.as_str(),
        to = body.status.as_str(),
        "Job status changed"
    );

    Ok(Json(DataResponse {
        data: JobResponse::try_from(&updated)?,
    }))
}
