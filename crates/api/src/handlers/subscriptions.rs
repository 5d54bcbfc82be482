//! Checkout verification after the payment provider redirects back.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use headhuntd_core::checkout::{poll_checkout_session, PollOutcome};
use headhuntd_core::error::CoreError;
use headhuntd_core::types::Timestamp;
use headhuntd_core::validation::CODE_MALFORMED;
use headhuntd_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const SESSION_ID_MAX_LEN: usize = 255;

#[derive(Debug, Deserialize)]
pub struct VerifyCheckoutRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyCheckoutResponse {
    Active {
        plan: String,
        session_id: String,
        subscribed_at: Option<Timestamp>,
    },
    /// Not settled yet; the client may call again later.
    Pending { session_id: String, attempts: u32 },
}

/// Session ids are opaque provider tokens such as `cs_test_a1B2`.
fn validate_session_id(id: &str) -> Result<(), CoreError> {
    let well_formed = !id.is_empty()
        && id.len() <= SESSION_ID_MAX_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !well_formed {
        return Err(CoreError::field(
            "session_id",
            CODE_MALFORMED,
            "Checkout session id is malformed",
        ));
    }
    Ok(())
}

/// POST /api/v1/subscriptions/verify
///
/// Polls the provider until the session settles, then records the plan on
/// the caller's account. Returns 202 with `status: pending` when the
/// session is still open after every attempt or the polling deadline. A
/// session created for another user answers 404 in every state.
pub async fn verify_checkout(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<VerifyCheckoutRequest>,
) -> AppResult<impl IntoResponse> {
    let session_id = input.session_id.trim();
    validate_session_id(session_id)?;

    let verifier = state.checkout.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Payment verification is not configured".into())
    })?;

    let outcome = poll_checkout_session(
        verifier.as_ref(),
        session_id,
        auth.user_id,
        &state.config.checkout.poll,
    )
    .await?;

    match outcome {
        PollOutcome::Settled(session) => {
            let entitlement = session.entitlement_for(auth.user_id)?;
            let user = UserRepo::record_subscription(
                &state.pool,
                entitlement.user_id,
                &entitlement.plan,
                Utc::now(),
            )
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "User",
                id: auth.user_id,
            }))?;

            tracing::info!(
                user_id = user.id,
                plan = %entitlement.plan,
                session_id = %entitlement.session_id,
                "Subscription activated"
            );

            Ok((
                StatusCode::OK,
                Json(DataResponse {
                    data: VerifyCheckoutResponse::Active {
                        plan: entitlement.plan,
                        session_id: entitlement.session_id,
                        subscribed_at: user.subscribed_at,
                    },
                }),
            ))
        }
        PollOutcome::Pending { attempts } => Ok((
            StatusCode::ACCEPTED,
            Json(DataResponse {
                data: VerifyCheckoutResponse::Pending {
                    session_id: session_id.to_string(),
                    attempts,
                },
            }),
        )),
    }
}
