//! Profile onboarding: role-conditional step flows and step payloads.
//!
//! Job seekers walk through four steps, employers through two. Steps
//! accumulate on the user record and may be saved in any order; the flow
//! only decides which step is suggested next. There is no explicit
//! completion flag: a step counts as done when its field is populated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::job_draft::completion_percentage;
use crate::roles::Role;
use crate::validation::{
    check_tags, decode_payload, dedupe_tags, field_errors, into_result, trim_in_place,
    trim_optional,
};

/// Maximum length of one selected skill.
pub const SKILL_MAX: usize = 100;

// ---------------------------------------------------------------------------
// Onboarding steps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    PersonalDetails,
    PersonalSummary,
    WorkExperience,
    Availability,
}

impl OnboardingStep {
    /// Parse a step name. Accepts snake_case, camelCase and kebab-case.
    pub fn parse(name: &str) -> Result<Self, CoreError> {
        match name {
            "personal_details" | "personalDetails" | "personal-details" => {
                Ok(Self::PersonalDetails)
            }
            "personal_summary" | "personalSummary" | "personal-summary" => {
                Ok(Self::PersonalSummary)
            }
            "work_experience" | "workExperience" | "work-experience" => Ok(Self::WorkExperience),
            "availability" => Ok(Self::Availability),
            _ => Err(CoreError::Validation(format!(
                "Unknown onboarding step '{name}'. Must be one of: personal_details, \
                 personal_summary, work_experience, availability"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PersonalDetails => "personal_details",
            Self::PersonalSummary => "personal_summary",
            Self::WorkExperience => "work_experience",
            Self::Availability => "availability",
        }
    }
}

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

const JOB_SEEKER_STEPS: [OnboardingStep; 4] = [
    OnboardingStep::PersonalDetails,
    OnboardingStep::PersonalSummary,
    OnboardingStep::WorkExperience,
    OnboardingStep::Availability,
];

const EMPLOYER_STEPS: [OnboardingStep; 2] = [
    OnboardingStep::PersonalDetails,
    OnboardingStep::PersonalSummary,
];

/// A fixed, role-selected sequence of onboarding steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnboardingFlow {
    steps: &'static [OnboardingStep],
}

impl OnboardingFlow {
    pub fn for_role(role: Role) -> Self {
        let steps: &'static [OnboardingStep] = match role {
            Role::JobSeeker => &JOB_SEEKER_STEPS,
            Role::Employer => &EMPLOYER_STEPS,
        };
        Self { steps }
    }

    pub fn steps(&self) -> &'static [OnboardingStep] {
        self.steps
    }

    pub fn contains(&self, step: OnboardingStep) -> bool {
        self.steps.contains(&step)
    }

    /// The step following `current` in this flow, or `None` at the end (or
    /// when `current` is not part of the flow).
    pub fn next_after(&self, current: OnboardingStep) -> Option<OnboardingStep> {
        let index = self.steps.iter().position(|s| *s == current)?;
        self.steps.get(index + 1).copied()
    }
}

// ---------------------------------------------------------------------------
// Step payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PersonalDetails {
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub phone_number: Option<String>,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PersonalSummary {
    #[validate(length(min = 1, max = 500))]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WorkExperience {
    #[validate(length(min = 1, max = 100))]
    pub selected_industry: String,
    #[validate(length(min = 1, max = 30))]
    pub selected_skills: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimePreference {
    Morning,
    Afternoon,
    Evening,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoticePreference {
    Immediately,
    OneWeek,
    TwoWeeks,
    OneMonth,
    MoreThanOneMonth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Availability {
    #[validate(length(min = 1))]
    pub time_preference: Vec<TimePreference>,
    pub start_date: NaiveDate,
    pub notice_preference: NoticePreference,
}

/// A validated, normalized payload for one onboarding step.
#[derive(Debug, Clone, PartialEq)]
pub enum OnboardingStepPayload {
    PersonalDetails(PersonalDetails),
    PersonalSummary(PersonalSummary),
    WorkExperience(WorkExperience),
    Availability(Availability),
}

impl OnboardingStepPayload {
    /// Decode, normalize and validate a raw payload for `step`.
    pub fn parse(step: OnboardingStep, raw: serde_json::Value) -> Result<Self, CoreError> {
        match step {
            OnboardingStep::PersonalDetails => {
                let mut details: PersonalDetails = decode_payload(step.as_str(), raw)?;
                trim_in_place(&mut details.full_name);
                trim_optional(&mut details.phone_number);
                trim_optional(&mut details.location);
                into_result(field_errors(&details))?;
                Ok(Self::PersonalDetails(details))
            }
            OnboardingStep::PersonalSummary => {
                let mut summary: PersonalSummary = decode_payload(step.as_str(), raw)?;
                trim_in_place(&mut summary.summary);
                into_result(field_errors(&summary))?;
                Ok(Self::PersonalSummary(summary))
            }
            OnboardingStep::WorkExperience => {
                let mut experience: WorkExperience = decode_payload(step.as_str(), raw)?;
                trim_in_place(&mut experience.selected_industry);
                experience.selected_skills =
                    dedupe_tags(std::mem::take(&mut experience.selected_skills));
                let mut errors = field_errors(&experience);
                errors.extend(check_tags(
                    "selected_skills",
                    &experience.selected_skills,
                    SKILL_MAX,
                ));
                into_result(errors)?;
                Ok(Self::WorkExperience(experience))
            }
            OnboardingStep::Availability => {
                let mut availability: Availability = decode_payload(step.as_str(), raw)?;
                let mut seen = Vec::with_capacity(availability.time_preference.len());
                availability.time_preference.retain(|p| {
                    if seen.contains(p) {
                        false
                    } else {
                        seen.push(*p);
                        true
                    }
                });
                into_result(field_errors(&availability))?;
                Ok(Self::Availability(availability))
            }
        }
    }

    pub fn step(&self) -> OnboardingStep {
        match self {
            Self::PersonalDetails(_) => OnboardingStep::PersonalDetails,
            Self::PersonalSummary(_) => OnboardingStep::PersonalSummary,
            Self::WorkExperience(_) => OnboardingStep::WorkExperience,
            Self::Availability(_) => OnboardingStep::Availability,
        }
    }
}

// ---------------------------------------------------------------------------
// Legacy personal summary
// ---------------------------------------------------------------------------

/// A personal summary as it may be found in storage.
///
/// Early accounts stored the summary as a bare JSON string; current writes
/// always use the object form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredPersonalSummary {
    Current(PersonalSummary),
    Legacy(String),
}

impl StoredPersonalSummary {
    /// Normalize to the object form. The text is kept as-is, even when empty.
    pub fn into_current(self) -> PersonalSummary {
        match self {
            Self::Current(summary) => summary,
            Self::Legacy(summary) => PersonalSummary { summary },
        }
    }
}

impl From<PersonalSummary> for StoredPersonalSummary {
    fn from(summary: PersonalSummary) -> Self {
        Self::Current(summary)
    }
}

// ---------------------------------------------------------------------------
// Profile aggregate
// ---------------------------------------------------------------------------

/// Onboarding state of one user.
#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingProfile {
    pub role: Role,
    pub personal_details: Option<PersonalDetails>,
    pub personal_summary: Option<PersonalSummary>,
    pub work_experience: Option<WorkExperience>,
    pub availability: Option<Availability>,
}

/// Progress summary for a profile, computed against its role's flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileProgress {
    pub steps: Vec<OnboardingStep>,
    pub completed_steps: Vec<OnboardingStep>,
    pub next_step: Option<OnboardingStep>,
    pub is_complete: bool,
    pub completion_percentage: u8,
}

impl OnboardingProfile {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            personal_details: None,
            personal_summary: None,
            work_experience: None,
            availability: None,
        }
    }

    pub fn flow(&self) -> OnboardingFlow {
        OnboardingFlow::for_role(self.role)
    }

    /// Whether the step's field is populated. A legacy empty summary does
    /// not count.
    pub fn is_step_completed(&self, step: OnboardingStep) -> bool {
        match step {
            OnboardingStep::PersonalDetails => self.personal_details.is_some(),
            OnboardingStep::PersonalSummary => self
                .personal_summary
                .as_ref()
                .is_some_and(|s| !s.summary.trim().is_empty()),
            OnboardingStep::WorkExperience => self.work_experience.is_some(),
            OnboardingStep::Availability => self.availability.is_some(),
        }
    }

    /// Ensure `step` belongs to this profile's flow.
    pub fn ensure_in_flow(&self, step: OnboardingStep) -> Result<(), CoreError> {
        if !self.flow().contains(step) {
            return Err(CoreError::Validation(format!(
                "Step '{}' is not part of the {} onboarding flow",
                step.as_str(),
                self.role.as_str()
            )));
        }
        Ok(())
    }

    /// Store one validated step payload, returning the suggested next step.
    pub fn apply_step(
        &mut self,
        payload: OnboardingStepPayload,
    ) -> Result<Option<OnboardingStep>, CoreError> {
        let step = payload.step();
        self.ensure_in_flow(step)?;
        match payload {
            OnboardingStepPayload::PersonalDetails(v) => self.personal_details = Some(v),
            OnboardingStepPayload::PersonalSummary(v) => self.personal_summary = Some(v),
            OnboardingStepPayload::WorkExperience(v) => self.work_experience = Some(v),
            OnboardingStepPayload::Availability(v) => self.availability = Some(v),
        }
        Ok(self.flow().next_after(step))
    }

    pub fn progress(&self) -> ProfileProgress {
        let steps = self.flow().steps().to_vec();
        let completed: Vec<OnboardingStep> = steps
            .iter()
            .copied()
            .filter(|s| self.is_step_completed(*s))
            .collect();
        let next_step = steps
            .iter()
            .copied()
            .find(|s| !self.is_step_completed(*s));
        ProfileProgress {
            completion_percentage: completion_percentage(completed.len(), steps.len()),
            is_complete: next_step.is_none(),
            next_step,
            completed_steps: completed,
            steps,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
