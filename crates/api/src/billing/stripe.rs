//! Stripe Checkout session lookup.
//!
//! Wraps `GET /v1/checkout/sessions/{id}` using [`reqwest`] and maps the
//! response onto the provider-neutral [`CheckoutSession`].

use std::time::Duration;

use async_trait::async_trait;
use headhuntd_core::checkout::{
    CheckoutError, CheckoutSession, CheckoutVerifier, PaymentStatus, SessionStatus,
};
use serde::Deserialize;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Reads checkout sessions from the Stripe API.
pub struct StripeCheckout {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

/// The subset of Stripe's Checkout Session object we rely on.
#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    status: Option<String>,
    payment_status: String,
    client_reference_id: Option<String>,
    #[serde(default)]
    metadata: std::collections::HashMap<String, String>,
}

impl StripeCheckout {
    /// * `api_base` - e.g. `https://api.stripe.com`, without a trailing slash.
    pub fn new(api_base: String, secret_key: String) -> Result<Self, CheckoutError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| CheckoutError::Provider(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key,
        })
    }
}

#[async_trait]
impl CheckoutVerifier for StripeCheckout {
    async fn fetch_session(&self, session_id: &str) -> Result<CheckoutSession, CheckoutError> {
        let response = self
            .client
            .get(format!("{}/v1/checkout/sessions/{session_id}", self.api_base))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| CheckoutError::Provider(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CheckoutError::SessionNotFound(session_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CheckoutError::Provider(format!(
                "Stripe API error ({}): {body}",
                status.as_u16()
            )));
        }

        let session: StripeSession = response
            .json()
            .await
            .map_err(|e| CheckoutError::Provider(format!("Invalid session payload: {e}")))?;
        Ok(session.into())
    }
}

impl From<StripeSession> for CheckoutSession {
    fn from(mut s: StripeSession) -> Self {
        let status = match s.status.as_deref() {
            Some("complete") => SessionStatus::Complete,
            Some("expired") => SessionStatus::Expired,
            _ => SessionStatus::Open,
        };
        let payment_status = match s.payment_status.as_str() {
            "paid" => PaymentStatus::Paid,
            "no_payment_required" => PaymentStatus::NoPaymentRequired,
            _ => PaymentStatus::Unpaid,
        };
        CheckoutSession {
            id: s.id,
            status,
            payment_status,
            client_reference_id: s.client_reference_id,
            plan: s.metadata.remove("plan"),
        }
    }
}
