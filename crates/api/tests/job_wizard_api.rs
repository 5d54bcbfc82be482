//! HTTP-level tests for the job creation wizard.

mod common;

use axum::body::Body;
use axum::http::{Method, Response, StatusCode};
use common::{app, body_json, get_auth, post_auth, put_json_auth, send_raw_auth, signup};
use serde_json::{json, Value};
use sqlx::PgPool;

fn job_details() -> Value {
    json!({
        "title": "Electrician",
        "employment_type": "full-time",
        "shift_preference": "morning",
        "requires_work_rights": true,
        "minimum_experience": "2-5-years"
    })
}

fn summary(description: &str) -> Value {
    json!({ "description": description })
}

fn post_job() -> Value {
    json!({
        "work_location": "on-site",
        "address": {
            "street": "1 Hunter St",
            "suburb": "Newcastle",
            "state": "NSW",
            "postcode": "2300"
        },
        "salary": { "min": 40, "max": 55, "currency": "AUD", "period": "hourly" },
        "number_of_positions": 2,
        "application_deadline": "2099-12-31"
    })
}

async fn create_job(pool: &PgPool, token: &str) -> i64 {
    let response = post_auth(app(pool), "/api/v1/jobs", token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_i64().expect("job id")
}

async fn save(pool: &PgPool, token: &str, job_id: i64, step: &str, body: Value) -> Response<Body> {
    put_json_auth(
        app(pool),
        &format!("/api/v1/jobs/{job_id}/steps/{step}"),
        body,
        token,
    )
    .await
}

async fn publish(pool: &PgPool, token: &str, job_id: i64) -> Response<Body> {
    post_auth(app(pool), &format!("/api/v1/jobs/{job_id}/publish"), token).await
}

async fn set_status(pool: &PgPool, token: &str, job_id: i64, status: &str) -> Response<Body> {
    put_json_auth(
        app(pool),
        &format!("/api/v1/jobs/{job_id}/status"),
        json!({ "status": status }),
        token,
    )
    .await
}

/// Save all four steps and publish.
async fn published_job(pool: &PgPool, token: &str) -> i64 {
    let job_id = create_job(pool, token).await;
    save(pool, token, job_id, "job_details", job_details()).await;
    save(pool, token, job_id, "job_summary", summary("Maintenance sparky")).await;
    save(pool, token, job_id, "qualifications", json!({ "tags": ["White Card"] })).await;
    save(pool, token, job_id, "post_job", post_job()).await;
    let response = publish(pool, token, job_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    job_id
}

async fn assert_field_error(response: Response<Body>, field: &str, code: &str) {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["fields"][0]["field"], field);
    assert_eq!(json["fields"][0]["code"], code);
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn new_draft_is_empty(pool: PgPool) {
    let (owner_id, token) = signup(app(&pool), "emp@example.com", "employer").await;

    let response = post_auth(app(&pool), "/api/v1/jobs", &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["owner_id"], owner_id);
    assert_eq!(data["status"], "draft");
    assert_eq!(data["completion_percentage"], 0);
    assert_eq!(data["next_step"], "job_details");
    assert_eq!(data["remaining_steps"].as_array().unwrap().len(), 4);
    assert!(data["job_details"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn job_seekers_cannot_create_jobs(pool: PgPool) {
    let (_, token) = signup(app(&pool), "seeker@example.com", "job_seeker").await;

    let response = post_auth(app(&pool), "/api/v1/jobs", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Walk-through: details (25%), oversized summary rejected (still 25%),
/// valid summary (50%), publish blocked on the remaining two steps.
#[sqlx::test(migrations = "../db/migrations")]
async fn electrician_wizard_walkthrough(pool: PgPool) {
    let (_, token) = signup(app(&pool), "sparky@example.com", "employer").await;
    let job_id = create_job(&pool, &token).await;

    let response = save(&pool, &token, job_id, "job_details", job_details()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["completion_percentage"], 25);
    assert_eq!(json["data"]["onboarding"]["job_details_completed"], true);

    let oversized = summary(&"x".repeat(5001));
    let response = save(&pool, &token, job_id, "jobSummary", oversized).await;
    assert_field_error(response, "description", "field_too_long").await;

    let response = get_auth(app(&pool), &format!("/api/v1/jobs/{job_id}"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["completion_percentage"], 25);
    assert!(json["data"]["job_summary"].is_null());

    let response = save(&pool, &token, job_id, "job-summary", summary(&"x".repeat(200))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["completion_percentage"], 50);
    assert_eq!(json["data"]["next_step"], "qualifications");

    let response = publish(&pool, &token, job_id).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INCOMPLETE_DRAFT");
    assert_eq!(json["missing_steps"], json!(["qualifications", "post_job"]));
}

/// Steps saved out of order still complete the draft, which then publishes
/// and appears in the published listing.
#[sqlx::test(migrations = "../db/migrations")]
async fn complete_draft_publishes_once(pool: PgPool) {
    let (_, token) = signup(app(&pool), "boss@example.com", "employer").await;
    let job_id = create_job(&pool, &token).await;

    for (step, body) in [
        ("post_job", post_job()),
        (
            "qualifications",
            json!({ "tags": ["A-Grade Licence", "White Card", "white card"] }),
        ),
        ("job_summary", summary("Commercial fit-outs across the Hunter.")),
        ("job_details", job_details()),
    ] {
        let response = save(&pool, &token, job_id, step, body).await;
        assert_eq!(response.status(), StatusCode::OK, "saving {step}");
    }

    let response = publish(&pool, &token, job_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await;
    assert_eq!(first["data"]["status"], "published");
    assert_eq!(first["data"]["completion_percentage"], 100);
    assert_eq!(
        first["data"]["qualifications"]["tags"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
    assert!(first["data"]["published_at"].is_string());

    // A duplicate submission keeps the original timestamp.
    let response = publish(&pool, &token, job_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await;
    assert_eq!(second["data"]["published_at"], first["data"]["published_at"]);

    let (_, seeker) = signup(app(&pool), "look@example.com", "job_seeker").await;
    let response = get_auth(app(&pool), "/api/v1/jobs/published", &seeker).await;
    let json = body_json(response).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![job_id]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_step_and_malformed_payload_are_rejected(pool: PgPool) {
    let (_, token) = signup(app(&pool), "emp@example.com", "employer").await;
    let job_id = create_job(&pool, &token).await;

    let response = save(&pool, &token, job_id, "salary", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let partial = json!({ "title": "Electrician" });
    let response = save(&pool, &token, job_id, "job_details", partial).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn numeric_currency_is_rejected(pool: PgPool) {
    let (_, token) = signup(app(&pool), "cash@example.com", "employer").await;
    let job_id = create_job(&pool, &token).await;

    let mut body = post_job();
    body["salary"]["currency"] = json!("123");
    let response = save(&pool, &token, job_id, "post_job", body).await;
    assert_field_error(response, "salary.currency", "invalid").await;
}

// ---------------------------------------------------------------------------
// Undecodable requests
// ---------------------------------------------------------------------------

/// Syntax errors, wrong content types and bad path segments all come back
/// in the structured error envelope.
#[sqlx::test(migrations = "../db/migrations")]
async fn undecodable_requests_get_structured_errors(pool: PgPool) {
    let (_, token) = signup(app(&pool), "garbled@example.com", "employer").await;
    let job_id = create_job(&pool, &token).await;
    let step_uri = format!("/api/v1/jobs/{job_id}/steps/job_summary");

    let response = send_raw_auth(
        app(&pool),
        Method::PUT,
        &step_uri,
        "application/json",
        r#"{"description": "unterminated"#,
        &token,
    )
    .await;
    assert_field_error(response, "body", "malformed").await;

    let response = send_raw_auth(
        app(&pool),
        Method::PUT,
        &step_uri,
        "text/plain",
        "Commercial fit-outs",
        &token,
    )
    .await;
    assert_field_error(response, "body", "malformed").await;

    let response = get_auth(app(&pool), "/api/v1/jobs/not-a-number", &token).await;
    assert_field_error(response, "path", "malformed").await;
}

/// A status outside the enum names the offending field.
#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_status_value_names_the_field(pool: PgPool) {
    let (_, token) = signup(app(&pool), "arch@example.com", "employer").await;
    let job_id = published_job(&pool, &token).await;

    let response = set_status(&pool, &token, job_id, "archived").await;
    assert_field_error(response, "status", "malformed").await;
}

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

/// Another employer gets the same 404 as for a missing job, with no data.
#[sqlx::test(migrations = "../db/migrations")]
async fn other_owners_draft_is_not_found(pool: PgPool) {
    let (_, owner) = signup(app(&pool), "a@example.com", "employer").await;
    let (_, intruder) = signup(app(&pool), "b@example.com", "employer").await;
    let job_id = create_job(&pool, &owner).await;
    save(&pool, &owner, job_id, "job_details", job_details()).await;

    let response = get_auth(app(&pool), &format!("/api/v1/jobs/{job_id}"), &intruder).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let foreign = body_json(response).await;
    assert!(foreign.get("data").is_none());

    let response = get_auth(app(&pool), "/api/v1/jobs/999999", &intruder).await;
    let missing = body_json(response).await;
    assert_eq!(foreign["code"], missing["code"]);

    let response = save(&pool, &intruder, job_id, "job_summary", summary("hijack")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = publish(&pool, &intruder, job_id).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Status changes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn published_job_can_be_closed_then_filled(pool: PgPool) {
    let (_, token) = signup(app(&pool), "emp@example.com", "employer").await;

    // Drafts cannot be closed.
    let draft_id = create_job(&pool, &token).await;
    let response = set_status(&pool, &token, draft_id, "closed").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let job_id = published_job(&pool, &token).await;
    let response = set_status(&pool, &token, job_id, "closed").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "closed");

    // Closed jobs are frozen.
    let response = save(&pool, &token, job_id, "job_summary", summary("Edited")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = set_status(&pool, &token, job_id, "filled").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = set_status(&pool, &token, job_id, "published").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get_auth(app(&pool), "/api/v1/jobs?status=filled", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_rejects_unknown_status_filter(pool: PgPool) {
    let (_, token) = signup(app(&pool), "emp@example.com", "employer").await;

    let response = get_auth(app(&pool), "/api/v1/jobs?status=archived", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let response = get_auth(app(&pool), "/api/v1/jobs?limit=lots", &token).await;
    assert_field_error(response, "query", "malformed").await;
}

/// A published job stays editable; saves keep it published.
#[sqlx::test(migrations = "../db/migrations")]
async fn published_job_accepts_edits(pool: PgPool) {
    let (_, token) = signup(app(&pool), "emp@example.com", "employer").await;
    let job_id = published_job(&pool, &token).await;

    let response = save(&pool, &token, job_id, "job_summary", summary("Updated")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app(&pool), &format!("/api/v1/jobs/{job_id}"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "published");
    assert_eq!(json["data"]["job_summary"]["description"], "Updated");
}
