//! Repository for the `jobs` table.
//!
//! Every write is scoped by `owner_id` so a job can only be changed by the
//! employer who created it; a miss returns `None` either way.

use headhuntd_core::job_draft::{JobStatus, JobStep};
use headhuntd_core::job_steps::JobStepPayload;
use headhuntd_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::job::Job;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, status, job_details, job_summary, qualifications, post_job, \
                       job_details_completed, job_summary_completed, qualifications_completed, \
                       post_job_completed, published_at, created_at, updated_at";

/// Storage column and completion flag for a step.
fn step_columns(step: JobStep) -> (&'static str, &'static str) {
    match step {
        JobStep::JobDetails => ("job_details", "job_details_completed"),
        JobStep::JobSummary => ("job_summary", "job_summary_completed"),
        JobStep::Qualifications => ("qualifications", "qualifications_completed"),
        JobStep::PostJob => ("post_job", "post_job_completed"),
    }
}

/// Provides persistence for job drafts and postings.
pub struct JobRepo;

impl JobRepo {
    /// Insert an empty draft for `owner_id`.
    pub async fn create(pool: &PgPool, owner_id: DbId) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (owner_id)
             VALUES ($1)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    /// Find a job by ID regardless of owner. Callers enforce ownership.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an employer's jobs, newest first, optionally filtered by status.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
        status: Option<JobStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs
             WHERE owner_id = $1 AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(owner_id)
            .bind(status.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List published jobs across all employers, most recently published first.
    pub async fn list_published(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs
             WHERE status = 'published'
             ORDER BY published_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Replace one step's payload and set its completion flag in a single
    /// statement.
    ///
    /// Returns `None` when the job does not exist, belongs to someone else,
    /// or is no longer editable.
    pub async fn save_step(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
        payload: &JobStepPayload,
    ) -> Result<Option<Job>, sqlx::Error> {
        match payload {
            JobStepPayload::JobDetails(v) => {
                Self::write_step(pool, id, owner_id, JobStep::JobDetails, v).await
            }
            JobStepPayload::JobSummary(v) => {
                Self::write_step(pool, id, owner_id, JobStep::JobSummary, v).await
            }
            JobStepPayload::Qualifications(v) => {
                Self::write_step(pool, id, owner_id, JobStep::Qualifications, v).await
            }
            JobStepPayload::PostJob(v) => {
                Self::write_step(pool, id, owner_id, JobStep::PostJob, v).await
            }
        }
    }

    async fn write_step<T: Serialize + Sync>(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
        step: JobStep,
        value: &T,
    ) -> Result<Option<Job>, sqlx::Error> {
        let (column, flag) = step_columns(step);
        let query = format!(
            "UPDATE jobs SET {column} = $3, {flag} = true
             WHERE id = $1 AND owner_id = $2 AND status IN ('draft', 'published')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(Json(value))
            .fetch_optional(pool)
            .await
    }

    /// Transition a complete draft to `published`.
    ///
    /// The guard repeats the publish preconditions so a concurrent change
    /// between read and write cannot publish an incomplete or closed job.
    pub async fn publish(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
        published_at: Timestamp,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs SET status = 'published', published_at = $3
             WHERE id = $1 AND owner_id = $2 AND status = 'draft'
               AND job_details_completed AND job_summary_completed
               AND qualifications_completed AND post_job_completed
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(published_at)
            .fetch_optional(pool)
            .await
    }

    /// Compare-and-set the status from `from` to `to`.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs SET status = $4
             WHERE id = $1 AND owner_id = $2 AND status = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(pool)
            .await
    }
}
