//! Role extractors.
//!
//! Each wraps [`AuthUser`] and rejects with 403 when the role does not match.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use headhuntd_core::error::CoreError;
use headhuntd_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `employer` role.
///
/// ```ignore
/// async fn create_job(RequireEmployer(user): RequireEmployer) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireEmployer(pub AuthUser);

impl FromRequestParts<AppState> for RequireEmployer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Employer {
            return Err(AppError::Core(CoreError::Forbidden(
                "Employer role required".into(),
            )));
        }
        Ok(RequireEmployer(user))
    }
}
