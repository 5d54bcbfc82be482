#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use headhuntd_api::auth::jwt::JwtConfig;
use headhuntd_api::config::{poll_deadline, CheckoutConfig, ServerConfig};
use headhuntd_api::router::build_app_router;
use headhuntd_api::state::AppState;
use headhuntd_core::checkout::{CheckoutVerifier, PollConfig};

/// Test configuration: fixed JWT secret, no payment provider, and polling
/// without delay.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        cookie_secure: false,
        password_min_length: 8,
        checkout: CheckoutConfig {
            stripe_secret_key: None,
            stripe_api_base: "http://127.0.0.1:0".to_string(),
            poll: PollConfig {
                max_attempts: 3,
                delay: Duration::ZERO,
                deadline: poll_deadline(30),
            },
        },
    }
}

/// Full application router with checkout verification disabled.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_checkout(pool, None)
}

/// Full application router over a clone of `pool`.
pub fn app(pool: &PgPool) -> Router {
    build_test_app(pool.clone())
}

/// Full application router using `verifier` for checkout sessions.
pub fn build_test_app_with_checkout(
    pool: PgPool,
    verifier: Option<Arc<dyn CheckoutVerifier>>,
) -> Router {
    build_test_app_with(pool, test_config(), verifier)
}

/// Full application router built from an explicit configuration.
pub fn build_test_app_with(
    pool: PgPool,
    config: ServerConfig,
    verifier: Option<Arc<dyn CheckoutVerifier>>,
) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        checkout: verifier,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

/// Send `body` verbatim, for requests a JSON value cannot express.
pub async fn send_raw_auth(
    app: Router,
    method: Method,
    uri: &str,
    content_type: &str,
    body: &str,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Sign up through the API and return `(user_id, access_token)`.
pub async fn signup(app: Router, email: &str, role: &str) -> (i64, String) {
    let response = post_json(
        app,
        "/api/v1/auth/signup",
        serde_json::json!({
            "email": email,
            "password": TEST_PASSWORD,
            "full_name": "Test User",
            "role": role,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "signup should succeed");
    let json = body_json(response).await;
    let id = json["data"]["user"]["id"].as_i64().expect("user id");
    let token = json["data"]["access_token"]
        .as_str()
        .expect("access token")
        .to_string();
    (id, token)
}
