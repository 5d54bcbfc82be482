//! Job posting model: the persisted form of a [`JobDraft`].

use headhuntd_core::error::CoreError;
use headhuntd_core::job_draft::{JobDraft, JobStatus, JobStep, OnboardingFlags};
use headhuntd_core::job_steps::{JobDetails, JobSummary, PostJob, Qualifications};
use headhuntd_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow)]
pub struct Job {
    pub id: DbId,
    pub owner_id: DbId,
    pub status: String,
    pub job_details: Option<Json<JobDetails>>,
    pub job_summary: Option<Json<JobSummary>>,
    pub qualifications: Option<Json<Qualifications>>,
    pub post_job: Option<Json<PostJob>>,
    pub job_details_completed: bool,
    pub job_summary_completed: bool,
    pub qualifications_completed: bool,
    pub post_job_completed: bool,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Job {
    pub fn flags(&self) -> OnboardingFlags {
        OnboardingFlags {
            job_details_completed: self.job_details_completed,
            job_summary_completed: self.job_summary_completed,
            qualifications_completed: self.qualifications_completed,
            post_job_completed: self.post_job_completed,
        }
    }

    /// Rebuild the domain aggregate from the row.
    pub fn to_draft(&self) -> Result<JobDraft, CoreError> {
        Ok(JobDraft {
            id: self.id,
            owner_id: self.owner_id,
            status: JobStatus::from_str_db(&self.status)?,
            job_details: self.job_details.as_ref().map(|j| j.0.clone()),
            job_summary: self.job_summary.as_ref().map(|j| j.0.clone()),
            qualifications: self.qualifications.as_ref().map(|j| j.0.clone()),
            post_job: self.post_job.as_ref().map(|j| j.0.clone()),
            onboarding: self.flags(),
            published_at: self.published_at,
        })
    }
}

/// Job projection: every saved step, flags, progress and timestamps.
#[derive(Debug, Clone, Serialize)]
pub struct JobResponse {
    #[serde(flatten)]
    pub job: JobDraft,
    pub completion_percentage: u8,
    pub next_step: Option<JobStep>,
    pub remaining_steps: Vec<JobStep>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<&Job> for JobResponse {
    type Error = CoreError;

    fn try_from(row: &Job) -> Result<Self, Self::Error> {
        let job = row.to_draft()?;
        let progress = job.progress();
        Ok(Self {
            job,
            completion_percentage: progress.completion_percentage,
            next_step: progress.next_step,
            remaining_steps: progress.remaining_steps,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
