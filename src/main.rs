use anyhow::Context;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod clock;
mod config;
mod db;
mod dto;
mod error;
mod extract;
mod handlers;
mod models;
mod services;
#[cfg(test)]
mod test_support;

use auth::jwt::JwtAuthProvider;
use auth::rate_limit::RateLimitState;
use auth::AuthProvider;
use clock::Clock;
use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<Config>,
    pub auth: Arc<dyn AuthProvider>,
    pub rate_limiter: RateLimitState,
    pub clock: Clock,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "serious_saturday_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env()?);
    tracing::info!(
        reporting_offset = %config.reporting_offset,
        "Streak days are bucketed in the configured reporting offset"
    );

    // Database
    let db = db::create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations applied");

    let auth: Arc<dyn AuthProvider> =
        Arc::new(JwtAuthProvider::new(&config.jwt_secret, &config.jwt_issuer));

    let rate_limiter =
        RateLimitState::new(config.log_rate_limit_per_minute, Duration::from_secs(60));
    auth::rate_limit::spawn_cleanup_worker(rate_limiter.clone());

    let state = AppState {
        db,
        config: config.clone(),
        auth,
        rate_limiter,
        clock: Clock::system(),
    };

    let app = app(state)
        .layer(cors_layer(&config)?)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

pub fn app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz));

    // Rate limiting reads the session, so it must sit inside require_auth.
    let logging_routes = Router::new()
        .route(
            "/api/completions",
            post(handlers::streaks::log_completion),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_logging,
        ));

    let protected_routes = Router::new()
        .route("/api/me", get(handlers::auth::me))
        // Catalog
        .route("/api/workouts", get(handlers::workouts::list_workouts))
        .route("/api/workouts", post(handlers::workouts::create_workout))
        .route("/api/workouts/:id", get(handlers::workouts::get_workout))
        // Subscriptions
        .route(
            "/api/subscriptions",
            get(handlers::subscriptions::list_subscriptions),
        )
        .route(
            "/api/subscriptions",
            post(handlers::subscriptions::subscribe),
        )
        .route(
            "/api/subscriptions/:workout_id",
            delete(handlers::subscriptions::unsubscribe),
        )
        // Streaks
        .route("/api/streaks", get(handlers::streaks::list_workout_streaks))
        .route("/api/streaks/stats", get(handlers::streaks::get_stats))
        .route(
            "/api/streaks/calendar",
            get(handlers::streaks::get_calendar),
        )
        .route(
            "/api/streaks/active-days",
            get(handlers::streaks::list_active_days),
        )
        .route(
            "/api/streaks/days/:date",
            get(handlers::streaks::get_day_status),
        )
        .merge(logging_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = vec![config
        .frontend_url
        .parse::<axum::http::HeaderValue>()
        .context("FRONTEND_URL is not a valid origin")?];
    // In dev, also allow LAN access (e.g. testing from another device)
    if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
        for o in extra.split(',') {
            if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                origins.push(hv);
            }
        }
    }

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true))
}
