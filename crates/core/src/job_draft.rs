//! Job creation wizard: draft aggregate, step sequencing and publish gate.
//!
//! A job starts life as an empty draft owned by one employer. Each of the
//! four [`JobStep`]s is saved independently (any order, any number of times)
//! and fully replaces its substructure. A step's completion flag is set the
//! first time it is saved and never cleared. Only a draft whose four flags
//! are all set may be published.
//!
//! Ownership is enforced here rather than in the handlers: every operation
//! takes the acting user's id and fails with [`CoreError::NotFound`] when it
//! does not own the draft, so callers cannot probe for other employers' jobs.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::job_steps::{JobDetails, JobStepPayload, JobSummary, PostJob, Qualifications};
use crate::types::{DbId, Timestamp};

/// Entity name used in not-found errors.
pub const ENTITY_JOB: &str = "Job";

// ---------------------------------------------------------------------------
// Job status
// ---------------------------------------------------------------------------

/// Lifecycle status of a job posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Published,
    Closed,
    Filled,
}

impl JobStatus {
    /// Parse a status string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "closed" => Ok(Self::Closed),
            "filled" => Ok(Self::Filled),
            _ => Err(CoreError::Validation(format!(
                "Invalid job status '{s}'. Must be one of: draft, published, closed, filled"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Closed => "closed",
            Self::Filled => "filled",
        }
    }

    /// Whether step payloads may still be edited.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Published)
    }

    /// Plain status writes allowed outside the publish gate.
    pub fn can_set_to(&self, target: JobStatus) -> bool {
        matches!(
            (self, target),
            (Self::Published, Self::Closed)
                | (Self::Published, Self::Filled)
                | (Self::Closed, Self::Filled)
        )
    }
}

// ---------------------------------------------------------------------------
// Job creation steps
// ---------------------------------------------------------------------------

/// The four steps of the job creation wizard, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStep {
    JobDetails,
    JobSummary,
    Qualifications,
    PostJob,
}

impl JobStep {
    /// Every step in wizard order.
    pub const ALL: [JobStep; 4] = [
        Self::JobDetails,
        Self::JobSummary,
        Self::Qualifications,
        Self::PostJob,
    ];

    /// Parse a step name. Accepts snake_case, camelCase and kebab-case.
    pub fn parse(name: &str) -> Result<Self, CoreError> {
        match name {
            "job_details" | "jobDetails" | "job-details" => Ok(Self::JobDetails),
            "job_summary" | "jobSummary" | "job-summary" => Ok(Self::JobSummary),
            "qualifications" => Ok(Self::Qualifications),
            "post_job" | "postJob" | "post-job" => Ok(Self::PostJob),
            _ => Err(CoreError::Validation(format!(
                "Unknown job step '{name}'. Must be one of: job_details, job_summary, \
                 qualifications, post_job"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JobDetails => "job_details",
            Self::JobSummary => "job_summary",
            Self::Qualifications => "qualifications",
            Self::PostJob => "post_job",
        }
    }
}

// ---------------------------------------------------------------------------
// Completion flags and progress
// ---------------------------------------------------------------------------

/// Per-step completion flags maintained on the draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingFlags {
    pub job_details_completed: bool,
    pub job_summary_completed: bool,
    pub qualifications_completed: bool,
    pub post_job_completed: bool,
}

impl OnboardingFlags {
    pub fn is_completed(&self, step: JobStep) -> bool {
        match step {
            JobStep::JobDetails => self.job_details_completed,
            JobStep::JobSummary => self.job_summary_completed,
            JobStep::Qualifications => self.qualifications_completed,
            JobStep::PostJob => self.post_job_completed,
        }
    }

    pub fn mark_completed(&mut self, step: JobStep) {
        match step {
            JobStep::JobDetails => self.job_details_completed = true,
            JobStep::JobSummary => self.job_summary_completed = true,
            JobStep::Qualifications => self.qualifications_completed = true,
            JobStep::PostJob => self.post_job_completed = true,
        }
    }

    /// Steps not yet saved, in canonical order.
    pub fn remaining(&self) -> Vec<JobStep> {
        JobStep::ALL
            .into_iter()
            .filter(|s| !self.is_completed(*s))
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        JobStep::ALL
            .iter()
            .filter(|s| self.is_completed(**s))
            .count()
    }

    pub fn all_completed(&self) -> bool {
        self.completed_count() == JobStep::ALL.len()
    }
}

/// `round(100 * completed / total)`; an empty flow counts as complete.
pub fn completion_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let completed = completed.min(total);
    ((completed as f64 * 100.0 / total as f64).round()) as u8
}

/// Progress summary returned after every save and on resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftProgress {
    pub onboarding: OnboardingFlags,
    pub completion_percentage: u8,
    pub next_step: Option<JobStep>,
    pub remaining_steps: Vec<JobStep>,
}

impl DraftProgress {
    pub fn from_flags(flags: OnboardingFlags) -> Self {
        let remaining = flags.remaining();
        Self {
            onboarding: flags,
            completion_percentage: completion_percentage(
                flags.completed_count(),
                JobStep::ALL.len(),
            ),
            next_step: remaining.first().copied(),
            remaining_steps: remaining,
        }
    }
}

// ---------------------------------------------------------------------------
// Draft aggregate
// ---------------------------------------------------------------------------

/// A job posting under construction (or already published).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDraft {
    pub id: DbId,
    pub owner_id: DbId,
    pub status: JobStatus,
    pub job_details: Option<JobDetails>,
    pub job_summary: Option<JobSummary>,
    pub qualifications: Option<Qualifications>,
    pub post_job: Option<PostJob>,
    pub onboarding: OnboardingFlags,
    pub published_at: Option<Timestamp>,
}

impl JobDraft {
    /// An empty shell in `draft` status.
    pub fn new(id: DbId, owner_id: DbId) -> Self {
        Self {
            id,
            owner_id,
            status: JobStatus::Draft,
            job_details: None,
            job_summary: None,
            qualifications: None,
            post_job: None,
            onboarding: OnboardingFlags::default(),
            published_at: None,
        }
    }

    /// Fail with `NotFound` unless `actor_id` owns this draft.
    pub fn ensure_owned_by(&self, actor_id: DbId) -> Result<(), CoreError> {
        if self.owner_id != actor_id {
            return Err(CoreError::NotFound {
                entity: ENTITY_JOB,
                id: self.id,
            });
        }
        Ok(())
    }

    pub fn progress(&self) -> DraftProgress {
        DraftProgress::from_flags(self.onboarding)
    }

    /// Apply one validated step payload: full replace of the substructure and
    /// set its completion flag.
    pub fn apply_step(
        &mut self,
        actor_id: DbId,
        payload: JobStepPayload,
    ) -> Result<DraftProgress, CoreError> {
        self.ensure_owned_by(actor_id)?;
        if !self.status.is_editable() {
            return Err(CoreError::Conflict(format!(
                "Job {} is {} and can no longer be edited",
                self.id,
                self.status.as_str()
            )));
        }

        let step = payload.step();
        match payload {
            JobStepPayload::JobDetails(v) => self.job_details = Some(v),
            JobStepPayload::JobSummary(v) => self.job_summary = Some(v),
            JobStepPayload::Qualifications(v) => self.qualifications = Some(v),
            JobStepPayload::PostJob(v) => self.post_job = Some(v),
        }
        self.onboarding.mark_completed(step);

        Ok(self.progress())
    }

    /// Check the publish preconditions without mutating.
    ///
    /// Returns `Ok(false)` when the job is already published (a repeated
    /// publish is a no-op), `Ok(true)` when the transition should happen.
    pub fn check_publishable(&self, actor_id: DbId) -> Result<bool, CoreError> {
        self.ensure_owned_by(actor_id)?;
        match self.status {
            JobStatus::Published => Ok(false),
            JobStatus::Closed | JobStatus::Filled => Err(CoreError::Conflict(format!(
                "Job {} is {} and cannot be published",
                self.id,
                self.status.as_str()
            ))),
            JobStatus::Draft => {
                let missing = self.onboarding.remaining();
                if !missing.is_empty() {
                    return Err(CoreError::IncompleteDraft {
                        missing: missing.iter().map(|s| s.as_str().to_string()).collect(),
                    });
                }
                Ok(true)
            }
        }
    }

    /// Draft -> published, guarded by [`check_publishable`](Self::check_publishable).
    ///
    /// Returns the effective publish timestamp (the original one when the
    /// job was already published).
    pub fn publish(&mut self, actor_id: DbId, now: Timestamp) -> Result<Timestamp, CoreError> {
        if self.check_publishable(actor_id)? {
            self.status = JobStatus::Published;
            self.published_at = Some(now);
        }
        Ok(self.published_at.unwrap_or(now))
    }

    /// Close or fill a published job.
    pub fn set_status(&mut self, actor_id: DbId, target: JobStatus) -> Result<(), CoreError> {
        self.ensure_owned_by(actor_id)?;
        if !self.status.can_set_to(target) {
            return Err(CoreError::Conflict(format!(
                "Cannot change job {} from {} to {}",
                self.id,
                self.status.as_str(),
                target.as_str()
            )));
        }
        self.status = target;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
