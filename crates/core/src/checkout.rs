//! Subscription checkout verification.
//!
//! After a user returns from the payment provider's hosted checkout page the
//! session may not have settled yet. [`poll_checkout_session`] asks the
//! provider (through a [`CheckoutVerifier`]) a bounded number of times with
//! a fixed delay between attempts, and reports [`PollOutcome::Pending`]
//! instead of waiting indefinitely. The whole loop also runs against an
//! overall deadline so it finishes inside the caller's request timeout.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::CoreError;
use crate::types::DbId;

/// Plan granted when the session carries no explicit plan metadata.
pub const DEFAULT_PLAN: &str = "premium";

#[derive(Debug, Clone, thiserror::Error)]
pub enum CheckoutError {
    #[error("Checkout session not found: {0}")]
    SessionNotFound(String),

    #[error("Checkout session expired: {0}")]
    Expired(String),

    #[error("Payment provider error: {0}")]
    Provider(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Open,
    Complete,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
}

/// The provider's view of one checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub status: SessionStatus,
    pub payment_status: PaymentStatus,
    /// Our user id, as passed to the provider when the session was created.
    pub client_reference_id: Option<String>,
    pub plan: Option<String>,
}

/// What a settled session grants its user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entitlement {
    pub user_id: DbId,
    pub plan: String,
    pub session_id: String,
}

impl CheckoutSession {
    /// Complete and paid (or free).
    pub fn is_settled(&self) -> bool {
        self.status == SessionStatus::Complete && self.payment_status != PaymentStatus::Unpaid
    }

    /// Whether the session was created for `actor_id`.
    pub fn is_owned_by(&self, actor_id: DbId) -> bool {
        self.client_reference_id
            .as_deref()
            .and_then(|r| r.trim().parse::<DbId>().ok())
            == Some(actor_id)
    }

    /// The entitlement this session grants to `actor_id`.
    ///
    /// A session belonging to someone else is reported as not found.
    pub fn entitlement_for(&self, actor_id: DbId) -> Result<Entitlement, CoreError> {
        if !self.is_owned_by(actor_id) {
            return Err(CoreError::NotFound {
                entity: "CheckoutSession",
                id: actor_id,
            });
        }
        Ok(Entitlement {
            user_id: actor_id,
            plan: self.plan.clone().unwrap_or_else(|| DEFAULT_PLAN.to_string()),
            session_id: self.id.clone(),
        })
    }
}

/// Reads checkout sessions from the payment provider.
#[async_trait]
pub trait CheckoutVerifier: Send + Sync {
    async fn fetch_session(&self, session_id: &str) -> Result<CheckoutSession, CheckoutError>;
}

/// Polling bounds.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub delay: Duration,
    /// Upper bound on the whole loop, provider calls and delays included.
    pub deadline: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_millis(2000),
            deadline: Duration::from_secs(25),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Settled(CheckoutSession),
    /// Still open after every attempt; the client should check back later.
    Pending { attempts: u32 },
}

/// Poll the provider until the session settles, attempts run out or the
/// deadline passes.
///
/// Every fetched session is checked against `actor_id` first: a session
/// created for someone else is reported as [`CheckoutError::SessionNotFound`]
/// whatever its state. Provider errors are retried like an unsettled
/// session; if the final attempt fails the error is returned. Unknown and
/// expired sessions stop polling immediately. Running out of time is
/// reported as [`PollOutcome::Pending`].
pub async fn poll_checkout_session(
    verifier: &dyn CheckoutVerifier,
    session_id: &str,
    actor_id: DbId,
    config: &PollConfig,
) -> Result<PollOutcome, CheckoutError> {
    let max_attempts = config.max_attempts.max(1);
    let started = Instant::now();

    for attempt in 1..=max_attempts {
        let remaining = config.deadline.saturating_sub(started.elapsed());
        if attempt > 1 && remaining.is_zero() {
            return Ok(still_pending(session_id, attempt - 1));
        }

        let fetched =
            match tokio::time::timeout(remaining, verifier.fetch_session(session_id)).await {
                Ok(fetched) => fetched,
                Err(_) => {
                    tracing::warn!(session_id, attempt, "Checkout poll deadline reached");
                    return Ok(still_pending(session_id, attempt));
                }
            };

        match fetched {
            Ok(session) if !session.is_owned_by(actor_id) => {
                tracing::warn!(session_id, actor_id, "Checkout session belongs to another user");
                return Err(CheckoutError::SessionNotFound(session_id.to_string()));
            }
            Ok(session) if session.is_settled() => {
                tracing::info!(session_id, attempt, "Checkout session settled");
                return Ok(PollOutcome::Settled(session));
            }
            Ok(session) if session.status == SessionStatus::Expired => {
                return Err(CheckoutError::Expired(session_id.to_string()));
            }
            Ok(session) => {
                tracing::debug!(
                    session_id,
                    attempt,
                    payment_status = ?session.payment_status,
                    "Checkout session not settled yet",
                );
            }
            Err(CheckoutError::Provider(e)) if attempt < max_attempts => {
                tracing::warn!(session_id, error = %e, "Checkout poll attempt {attempt} failed");
            }
            Err(e) => return Err(e),
        }

        if attempt < max_attempts {
            let remaining = config.deadline.saturating_sub(started.elapsed());
            tokio::time::sleep(config.delay.min(remaining)).await;
        }
    }

    Ok(still_pending(session_id, max_attempts))
}

fn still_pending(session_id: &str, attempts: u32) -> PollOutcome {
    tracing::info!(session_id, attempts, "Checkout session still pending");
    PollOutcome::Pending { attempts }
}
