//! Handlers for the `/auth` resource (signup, login, refresh, logout, me).

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use chrono::Utc;
use headhuntd_core::error::CoreError;
use headhuntd_core::roles::Role;
use headhuntd_core::validation::{field_errors, into_result, CODE_MALFORMED};
use headhuntd_db::models::session::CreateSession;
use headhuntd_db::models::user::{CreateUser, User, UserResponse};
use headhuntd_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::cookies::{
    clear_cookie, read_cookie, set_cookie, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};
use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Consecutive failed logins before the account is locked.
const MAX_FAILED_ATTEMPTS: i32 = 5;

const LOCK_DURATION_MINS: i64 = 15;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Returned by signup, login and refresh. The same tokens are also set as
/// cookies.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    AppJson(mut input): AppJson<SignupRequest>,
) -> AppResult<impl IntoResponse> {
    input.email = input.email.trim().to_lowercase();
    input.full_name = input.full_name.trim().to_string();
    into_result(field_errors(&input))?;
    validate_password_strength(&input.password, state.config.password_min_length)
        .map_err(|msg| CoreError::field("password", "weak_password", msg))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: input.email,
            password_hash,
            full_name: input.full_name,
            role: input.role,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = %user.role, "User signed up");

    let (response, cookies) = issue_tokens(&state, &user).await?;
    Ok((
        StatusCode::CREATED,
        AppendHeaders(cookies),
        Json(DataResponse { data: response }),
    ))
}

/// POST /api/v1/auth/login
///
/// Five consecutive failures lock the account for fifteen minutes.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        let failures = UserRepo::increment_failed_login(&state.pool, user.id).await?;
        if failures >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, failures, "Account locked after failed logins");
        }
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let (response, cookies) = issue_tokens(&state, &user).await?;
    Ok((AppendHeaders(cookies), Json(DataResponse { data: response })))
}

/// POST /api/v1/auth/refresh
///
/// The refresh token may come in the JSON body or the `refresh_token`
/// cookie. The presented session is revoked and a new one issued.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let from_body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<RefreshRequest>(&body)
            .map_err(|e| {
                CoreError::field("body", CODE_MALFORMED, format!("Invalid request body: {e}"))
            })?
            .refresh_token
    };
    let token = from_body
        .or_else(|| read_cookie(&headers, REFRESH_TOKEN_COOKIE))
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Missing refresh token".into())))?;

    let invalid =
        || AppError::Core(CoreError::Unauthorized("Invalid or expired refresh token".into()));

    let session = SessionRepo::find_active_by_hash(&state.pool, &hash_refresh_token(&token))
        .await?
        .ok_or_else(invalid)?;

    // Lost the race against a concurrent refresh with the same token.
    if !SessionRepo::revoke(&state.pool, session.id).await? {
        return Err(invalid());
    }

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let (response, cookies) = issue_tokens(&state, &user).await?;
    Ok((AppendHeaders(cookies), Json(DataResponse { data: response })))
}

/// POST /api/v1/auth/logout
///
/// Revokes every session of the user and clears both cookies.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth.user_id).await?;
    tracing::info!(user_id = auth.user_id, revoked, "User logged out");

    let secure = state.config.cookie_secure;
    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([
            (SET_COOKIE, clear_cookie(ACCESS_TOKEN_COOKIE, secure)),
            (SET_COOKIE, clear_cookie(REFRESH_TOKEN_COOKIE, secure)),
        ]),
    ))
}

/// GET /api/v1/auth/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sign an access token, persist a refresh session and build the cookies.
async fn issue_tokens(
    state: &AppState,
    user: &User,
) -> AppResult<(AuthResponse, [(axum::http::HeaderName, String); 2])> {
    let jwt = &state.config.jwt;
    let access_token = generate_access_token(user.id, user.role()?, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            expires_at: Utc::now() + chrono::Duration::days(jwt.refresh_token_expiry_days),
            user_agent: None,
            ip_address: None,
        },
    )
    .await?;

    let secure = state.config.cookie_secure;
    let cookies = [
        (
            SET_COOKIE,
            set_cookie(ACCESS_TOKEN_COOKIE, &access_token, jwt.access_token_max_age(), secure),
        ),
        (
            SET_COOKIE,
            set_cookie(
                REFRESH_TOKEN_COOKIE,
                &refresh_plaintext,
                jwt.refresh_token_max_age(),
                secure,
            ),
        ),
    ];

    Ok((
        AuthResponse {
            access_token,
            refresh_token: refresh_plaintext,
            expires_in: jwt.access_token_max_age(),
            user: UserResponse::from(user),
        },
        cookies,
    ))
}
