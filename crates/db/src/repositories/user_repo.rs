//! Repository for the `users` table.

use headhuntd_core::onboarding::OnboardingStepPayload;
use headhuntd_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateProfile, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, full_name, role, \
                       personal_details, personal_summary, work_experience, availability, \
                       subscription_plan, subscribed_at, failed_login_count, locked_until, \
                       last_login_at, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, password_hash, full_name, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.full_name)
            .bind(input.role.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email. Emails are stored lower-cased, so the lookup is
    /// case-insensitive.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = LOWER($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Apply a profile patch. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                full_name = COALESCE($2, full_name),
                email = COALESCE(LOWER($3), email)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.email)
            .fetch_optional(pool)
            .await
    }

    /// Persist one onboarding step as a single-column update.
    ///
    /// Saving personal details also copies the full name onto the account.
    pub async fn save_onboarding_step(
        pool: &PgPool,
        id: DbId,
        payload: &OnboardingStepPayload,
    ) -> Result<Option<User>, sqlx::Error> {
        match payload {
            OnboardingStepPayload::PersonalDetails(details) => {
                let query = format!(
                    "UPDATE users SET personal_details = $2, full_name = $3
                     WHERE id = $1
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, User>(&query)
                    .bind(id)
                    .bind(Json(details))
                    .bind(&details.full_name)
                    .fetch_optional(pool)
                    .await
            }
            OnboardingStepPayload::PersonalSummary(summary) => {
                Self::set_json_column(pool, id, "personal_summary", summary).await
            }
            OnboardingStepPayload::WorkExperience(experience) => {
                Self::set_json_column(pool, id, "work_experience", experience).await
            }
            OnboardingStepPayload::Availability(availability) => {
                Self::set_json_column(pool, id, "availability", availability).await
            }
        }
    }

    /// `column` is always one of the fixed onboarding column names above.
    async fn set_json_column<T: Serialize + Sync>(
        pool: &PgPool,
        id: DbId,
        column: &'static str,
        value: &T,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET {column} = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(Json(value))
            .fetch_optional(pool)
            .await
    }

    /// Increment the failed login counter by 1, returning the new count.
    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE users SET failed_login_count = failed_login_count + 1
             WHERE id = $1
             RETURNING failed_login_count",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Lock a user account until the specified timestamp.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful login: reset `failed_login_count` to 0, clear `locked_until`,
    /// and set `last_login_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a verified subscription. Returns `None` if the user is gone.
    pub async fn record_subscription(
        pool: &PgPool,
        id: DbId,
        plan: &str,
        subscribed_at: Timestamp,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET subscription_plan = $2, subscribed_at = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(plan)
            .bind(subscribed_at)
            .fetch_optional(pool)
            .await
    }
}
