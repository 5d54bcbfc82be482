use std::time::Duration;

use headhuntd_core::checkout::PollConfig;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Defaults suit local development; production overrides via the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub jwt: JwtConfig,
    /// Add `Secure` to auth cookies (enable behind HTTPS).
    pub cookie_secure: bool,
    pub password_min_length: usize,
    pub checkout: CheckoutConfig,
}

/// Payment provider access and polling bounds for checkout verification.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// `None` disables verification; the endpoint answers 503.
    pub stripe_secret_key: Option<String>,
    pub stripe_api_base: String,
    pub poll: PollConfig,
}

/// Time reserved for recording the subscription and writing the response
/// after checkout polling stops.
const POLL_HEADROOM: Duration = Duration::from_secs(2);

/// Polling budget that fits inside a request timeout of `request_timeout_secs`.
pub fn poll_deadline(request_timeout_secs: u64) -> Duration {
    let timeout = Duration::from_secs(request_timeout_secs);
    timeout.saturating_sub(POLL_HEADROOM).max(timeout / 2)
}

fn env_or<T: std::str::FromStr>(key: &str, default: &str) -> T {
    std::env::var(key)
        .unwrap_or_else(|_| default.into())
        .parse()
        .unwrap_or_else(|_| panic!("{key} has an invalid value"))
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                  |
    /// |------------------------------|--------------------------|
    /// | `HOST`                       | `0.0.0.0`                |
    /// | `PORT`                       | `3000`                   |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                     |
    /// | `COOKIE_SECURE`              | `false`                  |
    /// | `PASSWORD_MIN_LENGTH`        | `8`                      |
    /// | `STRIPE_SECRET_KEY`          | unset                    |
    /// | `STRIPE_API_BASE`            | `https://api.stripe.com` |
    /// | `CHECKOUT_POLL_MAX_ATTEMPTS` | `5`                      |
    /// | `CHECKOUT_POLL_DELAY_MS`     | `2000`                   |
    ///
    /// Checkout polling stops at [`poll_deadline`] of the request timeout.
    /// JWT settings are read by [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on unparseable values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", "3000");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30");
        let cookie_secure: bool = env_or("COOKIE_SECURE", "false");
        let password_min_length: usize = env_or("PASSWORD_MIN_LENGTH", "8");

        let checkout = CheckoutConfig {
            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            stripe_api_base: std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".into()),
            poll: PollConfig {
                max_attempts: env_or("CHECKOUT_POLL_MAX_ATTEMPTS", "5"),
                delay: Duration::from_millis(env_or("CHECKOUT_POLL_DELAY_MS", "2000")),
                deadline: poll_deadline(request_timeout_secs),
            },
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            cookie_secure,
            password_min_length,
            checkout,
        }
    }
}
