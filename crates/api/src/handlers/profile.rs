//! Handlers for the caller's own profile and onboarding steps.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use headhuntd_core::error::CoreError;
use headhuntd_core::onboarding::{OnboardingStep, OnboardingStepPayload};
use headhuntd_core::types::DbId;
use headhuntd_core::validation::{field_errors, into_result, trim_optional};
use headhuntd_db::models::user::{ProfileResponse, UpdateProfile, User};
use headhuntd_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub full_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

/// Result of saving an onboarding step.
#[derive(Debug, Serialize)]
pub struct SaveOnboardingResponse {
    pub saved_step: OnboardingStep,
    /// The step after the saved one in the role's flow, if any.
    pub next_step: Option<OnboardingStep>,
    pub profile: ProfileResponse,
}

fn user_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

async fn load_user(pool: &sqlx::PgPool, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))
}

/// GET /api/v1/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    let user = load_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: ProfileResponse::try_from(&user)?,
    }))
}

/// PATCH /api/v1/profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(mut input): AppJson<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    trim_optional(&mut input.full_name);
    trim_optional(&mut input.email);
    into_result(field_errors(&input))?;

    let patch = UpdateProfile {
        full_name: input.full_name,
        email: input.email.map(|e| e.to_lowercase()),
    };
    let user = UserRepo::update_profile(&state.pool, auth.user_id, &patch)
        .await?
        .ok_or_else(|| user_not_found(auth.user_id))?;

    tracing::info!(user_id = user.id, "Profile updated");

    Ok(Json(DataResponse {
        data: ProfileResponse::try_from(&user)?,
    }))
}

/// PUT /api/v1/profile/onboarding/{step}
///
/// Steps may be saved in any order; the response suggests the next one.
pub async fn save_onboarding_step(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(step_name): AppPath<String>,
    AppJson(raw): AppJson<serde_json::Value>,
) -> AppResult<impl IntoResponse> {
    let step = OnboardingStep::parse(&step_name)?;
    let user = load_user(&state.pool, auth.user_id).await?;
    let mut profile = user.onboarding_profile()?;

    // Role check first so an out-of-flow step is rejected before its body.
    profile.ensure_in_flow(step)?;
    let payload = OnboardingStepPayload::parse(step, raw)?;
    let next_step = profile.apply_step(payload.clone())?;

    let updated = UserRepo::save_onboarding_step(&state.pool, auth.user_id, &payload)
        .await?
        .ok_or_else(|| user_not_found(auth.user_id))?;

    tracing::info!(user_id = auth.user_id, step = step.as_str(), "Onboarding step saved");

    Ok(Json(DataResponse {
        data: SaveOnboardingResponse {
            saved_step: step,
            next_step,
            profile: ProfileResponse::try_from(&updated)?,
        },
    }))
}
