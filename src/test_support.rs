//! Shared fixtures for router tests: in-memory SQLite with migrations
//! applied, a fixed config, and signed access tokens.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;
use uuid::Uuid;

use crate::auth::jwt::{Claims, JwtAuthProvider, TokenType};
use crate::auth::rate_limit::RateLimitState;
use crate::clock::Clock;
use crate::config::Config;
use crate::AppState;

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        frontend_url: "http://localhost:3001".into(),
        jwt_secret: "test-secret".into(),
        jwt_issuer: "serious-saturday-api".into(),
        reporting_offset: FixedOffset::east_opt(0).unwrap(),
        calendar_default_days: 30,
        calendar_max_days: 366,
        log_rate_limit_per_minute: 100,
    }
}

pub async fn test_state() -> AppState {
    test_state_with(test_config()).await
}

/// Midday, so fixtures a few days back never straddle a date change.
pub fn test_now() -> DateTime<Utc> {
    "2026-03-15T12:00:00Z".parse().unwrap()
}

pub async fn test_state_with(config: Config) -> AppState {
    // One connection: every connection to :memory: is its own database.
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    state_from(db, config).await
}

/// File-backed state, so the pool really hands out concurrent connections.
pub async fn test_state_on_disk(dir: &Path) -> AppState {
    let url = format!("sqlite://{}", dir.join("streaks.db").display());
    let db = crate::db::create_pool(&url).await.unwrap();
    state_from(db, test_config()).await
}

async fn state_from(db: SqlitePool, config: Config) -> AppState {
    sqlx::migrate!("./migrations").run(&db).await.unwrap();

    let config = Arc::new(config);
    AppState {
        db,
        auth: Arc::new(JwtAuthProvider::new(&config.jwt_secret, &config.jwt_issuer)),
        rate_limiter: RateLimitState::new(
            config.log_rate_limit_per_minute,
            StdDuration::from_secs(60),
        ),
        config,
        clock: Clock::fixed(test_now()),
    }
}

pub fn access_token(config: &Config, user_id: Uuid) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        email: "athlete@example.com".into(),
        exp: (now + Duration::minutes(15)).timestamp(),
        iat: now.timestamp(),
        iss: config.jwt_issuer.clone(),
        token_type: TokenType::Access,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .unwrap()
}

pub async fn insert_workout(db: &SqlitePool, name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO workouts (name, source, created_at) VALUES (?, 'local', ?) RETURNING id",
    )
    .bind(name)
    .bind(Utc::now())
    .fetch_one(db)
    .await
    .unwrap()
}

pub async fn subscribe(db: &SqlitePool, user_id: Uuid, workout_id: i64) {
    sqlx::query("INSERT INTO subscriptions (user_id, workout_id, subscribed_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(workout_id)
        .bind(Utc::now())
        .execute(db)
        .await
        .unwrap();
}

pub async fn insert_completion(
    db: &SqlitePool,
    user_id: Uuid,
    workout_id: Option<i64>,
    completed_at: DateTime<Utc>,
) {
    sqlx::query("INSERT INTO completions (user_id, workout_id, completed_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(workout_id)
        .bind(completed_at)
        .execute(db)
        .await
        .unwrap();
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request(Method::GET, uri, token, None)
}

pub fn post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    request(Method::POST, uri, token, Some(body))
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    request(Method::DELETE, uri, token, None)
}

/// Run one request through the router and decode the JSON body.
pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
