//! HTTP-level tests for checkout verification, using an in-process provider.

mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{app, body_json, get_auth, post_json_auth, signup};
use headhuntd_core::checkout::{
    CheckoutError, CheckoutSession, CheckoutVerifier, PaymentStatus, PollConfig, SessionStatus,
};
use serde_json::json;
use sqlx::PgPool;

/// Answers every lookup with a fixed session after an optional latency and
/// counts the calls.
struct FixedVerifier {
    session: Result<CheckoutSession, CheckoutError>,
    latency: Duration,
    calls: AtomicU32,
}

impl FixedVerifier {
    fn new(session: Result<CheckoutSession, CheckoutError>) -> Arc<Self> {
        Self::slow(session, Duration::ZERO)
    }

    fn slow(session: Result<CheckoutSession, CheckoutError>, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            session,
            latency,
            calls: AtomicU32::new(0),
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CheckoutVerifier for FixedVerifier {
    async fn fetch_session(&self, _session_id: &str) -> Result<CheckoutSession, CheckoutError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.session.clone()
    }
}

fn session(owner: i64, status: SessionStatus, payment: PaymentStatus) -> CheckoutSession {
    CheckoutSession {
        id: "cs_test_123".into(),
        status,
        payment_status: payment,
        client_reference_id: Some(owner.to_string()),
        plan: Some("employer-pro".into()),
    }
}

async fn signup_employer(pool: &PgPool, email: &str) -> (i64, String) {
    signup(app(pool), email, "employer").await
}

async fn verify(
    pool: &PgPool,
    verifier: Option<Arc<dyn CheckoutVerifier>>,
    token: &str,
    session_id: &str,
) -> axum::http::Response<axum::body::Body> {
    post_json_auth(
        common::build_test_app_with_checkout(pool.clone(), verifier),
        "/api/v1/subscriptions/verify",
        json!({ "session_id": session_id }),
        token,
    )
    .await
}

async fn subscription_plan(pool: &PgPool, token: &str) -> serde_json::Value {
    let response = get_auth(app(pool), "/api/v1/auth/me", token).await;
    let json = body_json(response).await;
    json["data"]["subscription_plan"].clone()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unconfigured_provider_is_unavailable(pool: PgPool) {
    let (_, token) = signup_employer(&pool, "pay@example.com").await;

    let response = verify(&pool, None, &token, "cs_test_123").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

/// A settled session records the plan on the account.
#[sqlx::test(migrations = "../db/migrations")]
async fn settled_session_activates_plan(pool: PgPool) {
    let (id, token) = signup_employer(&pool, "pay@example.com").await;
    let verifier = FixedVerifier::new(Ok(session(
        id,
        SessionStatus::Complete,
        PaymentStatus::Paid,
    )));

    let response = verify(&pool, Some(verifier.clone()), &token, "cs_test_123").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "active");
    assert_eq!(json["data"]["plan"], "employer-pro");
    assert_eq!(verifier.calls(), 1);

    let response = get_auth(app(&pool), "/api/v1/auth/me", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["subscription_plan"], "employer-pro");
    assert!(json["data"]["subscribed_at"].is_string());
}

/// An open session is polled up to the attempt limit, then reported pending.
#[sqlx::test(migrations = "../db/migrations")]
async fn open_session_reports_pending(pool: PgPool) {
    let (id, token) = signup_employer(&pool, "wait@example.com").await;
    let verifier = FixedVerifier::new(Ok(session(id, SessionStatus::Open, PaymentStatus::Unpaid)));

    let response = verify(&pool, Some(verifier.clone()), &token, "cs_test_123").await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["attempts"], 3);
    assert_eq!(verifier.calls(), 3);
}

/// Someone else's session looks like a missing one and grants nothing.
#[sqlx::test(migrations = "../db/migrations")]
async fn foreign_session_is_not_found(pool: PgPool) {
    let (id, token) = signup_employer(&pool, "mine@example.com").await;
    let verifier = FixedVerifier::new(Ok(session(
        id + 1000,
        SessionStatus::Complete,
        PaymentStatus::Paid,
    )));

    let response = verify(&pool, Some(verifier), &token, "cs_test_123").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(subscription_plan(&pool, &token).await.is_null());
}

/// A foreign session's state is not observable: expired and open sessions
/// answer the same 404 as a settled one.
#[sqlx::test(migrations = "../db/migrations")]
async fn foreign_session_state_is_hidden(pool: PgPool) {
    let (id, token) = signup_employer(&pool, "nosy@example.com").await;

    for status in [SessionStatus::Expired, SessionStatus::Open] {
        let verifier = FixedVerifier::new(Ok(session(id + 1000, status, PaymentStatus::Unpaid)));

        let response = verify(&pool, Some(verifier.clone()), &token, "cs_test_123").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "status {status:?}");
        let json = body_json(response).await;
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(verifier.calls(), 1, "no further polling for {status:?}");
    }

    assert!(subscription_plan(&pool, &token).await.is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn expired_and_malformed_sessions_are_rejected(pool: PgPool) {
    let (id, token) = signup_employer(&pool, "late@example.com").await;
    let verifier = FixedVerifier::new(Ok(session(
        id,
        SessionStatus::Expired,
        PaymentStatus::Unpaid,
    )));

    let response = verify(&pool, Some(verifier.clone()), &token, "cs_test_123").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = verify(&pool, Some(verifier), &token, "../../v1/customers").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn provider_failure_is_bad_gateway(pool: PgPool) {
    let (_, token) = signup_employer(&pool, "down@example.com").await;
    let verifier = FixedVerifier::new(Err(CheckoutError::Provider("connection refused".into())));

    let response = verify(&pool, Some(verifier.clone()), &token, "cs_test_123").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(verifier.calls(), 3);
}

/// A slow provider makes polling stop at its deadline with a pending answer
/// instead of running into the request timeout.
#[sqlx::test(migrations = "../db/migrations")]
async fn slow_provider_reports_pending_before_the_request_timeout(pool: PgPool) {
    let (id, token) = signup_employer(&pool, "slow@example.com").await;
    let verifier = FixedVerifier::slow(
        Ok(session(id, SessionStatus::Open, PaymentStatus::Unpaid)),
        Duration::from_millis(400),
    );

    let mut config = common::test_config();
    config.request_timeout_secs = 1;
    config.checkout.poll = PollConfig {
        max_attempts: 5,
        delay: Duration::from_millis(200),
        deadline: headhuntd_api::config::poll_deadline(1),
    };
    let app = common::build_test_app_with(pool.clone(), config, Some(verifier.clone()));

    let response = post_json_auth(
        app,
        "/api/v1/subscriptions/verify",
        json!({ "session_id": "cs_test_123" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert!(json["data"]["attempts"].as_u64().unwrap() < 5);
    assert!(verifier.calls() < 5);
}
