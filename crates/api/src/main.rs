use std::net::SocketAddr;
use std::sync::Arc;

use headhuntd_api::billing::stripe::StripeCheckout;
use headhuntd_api::config::ServerConfig;
use headhuntd_api::router::build_app_router;
use headhuntd_api::state::AppState;
use headhuntd_core::checkout::CheckoutVerifier;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "headhuntd_api=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = headhuntd_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    headhuntd_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    headhuntd_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Payment provider ---
    let checkout: Option<Arc<dyn CheckoutVerifier>> = match &config.checkout.stripe_secret_key {
        Some(key) => {
            let client: Arc<dyn CheckoutVerifier> = Arc::new(
                StripeCheckout::new(config.checkout.stripe_api_base.clone(), key.clone())
                    .expect("Failed to build Stripe client"),
            );
            tracing::info!(
                api_base = %config.checkout.stripe_api_base,
                "Checkout verification enabled"
            );
            Some(client)
        }
        None => {
            tracing::warn!("STRIPE_SECRET_KEY not set, checkout verification disabled");
            None
        }
    };

    // --- App ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        checkout,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Resolve on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
