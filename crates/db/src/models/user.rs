//! User entity model and DTOs.

use headhuntd_core::error::CoreError;
use headhuntd_core::onboarding::{
    Availability, OnboardingProfile, PersonalDetails, PersonalSummary, ProfileProgress,
    StoredPersonalSummary, WorkExperience,
};
use headhuntd_core::roles::Role;
use headhuntd_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] or [`ProfileResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub personal_details: Option<Json<PersonalDetails>>,
    pub personal_summary: Option<Json<StoredPersonalSummary>>,
    pub work_experience: Option<Json<WorkExperience>>,
    pub availability: Option<Json<Availability>>,
    pub subscription_plan: Option<String>,
    pub subscribed_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn role(&self) -> Result<Role, CoreError> {
        Role::from_str_db(&self.role)
    }

    /// Onboarding state with the personal summary in object form.
    pub fn onboarding_profile(&self) -> Result<OnboardingProfile, CoreError> {
        Ok(OnboardingProfile {
            role: self.role()?,
            personal_details: self.personal_details.as_ref().map(|j| j.0.clone()),
            personal_summary: self
                .personal_summary
                .as_ref()
                .map(|j| j.0.clone().into_current()),
            work_experience: self.work_experience.as_ref().map(|j| j.0.clone()),
            availability: self.availability.as_ref().map(|j| j.0.clone()),
        })
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub subscription_plan: Option<String>,
    pub subscribed_at: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role.clone(),
            subscription_plan: user.subscription_plan.clone(),
            subscribed_at: user.subscribed_at,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// Profile projection: account fields, onboarding step values and progress.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub personal_details: Option<PersonalDetails>,
    pub personal_summary: Option<PersonalSummary>,
    pub work_experience: Option<WorkExperience>,
    pub availability: Option<Availability>,
    #[serde(flatten)]
    pub progress: ProfileProgress,
}

impl TryFrom<&User> for ProfileResponse {
    type Error = CoreError;

    fn try_from(user: &User) -> Result<Self, Self::Error> {
        let profile = user.onboarding_profile()?;
        let progress = profile.progress();
        Ok(Self {
            user: UserResponse::from(user),
            personal_details: profile.personal_details,
            personal_summary: profile.personal_summary,
            work_experience: profile.work_experience,
            availability: profile.availability,
            progress,
        })
    }
}

/// DTO for creating a new user. `email` must already be lower-cased.
#[derive(Debug)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
}

/// DTO for a profile patch. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub email: Option<String>,
}
