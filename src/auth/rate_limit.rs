use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    Extension,
};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::auth::Session;
use crate::error::AppError;
use crate::AppState;

const CLEANUP_INTERVAL_SECS: u64 = 300;

/// Fixed-window request counter, in memory (single-instance deployments).
#[derive(Clone)]
pub struct RateLimitState {
    entries: Arc<Mutex<HashMap<String, RateLimitEntry>>>,
    max_requests: u32,
    window: Duration,
}

struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

impl RateLimitState {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    /// Count one request for `key`. Returns Ok(remaining) or Err(retry_after).
    pub async fn check(&self, key: &str) -> Result<u32, Duration> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let entry = entries.entry(key.to_string()).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) > self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count >= self.max_requests {
            let retry_after = self
                .window
                .saturating_sub(now.duration_since(entry.window_start));
            return Err(retry_after);
        }

        entry.count += 1;
        Ok(self.max_requests - entry.count)
    }

    /// Drop entries idle for more than two windows.
    pub async fn cleanup(&self) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let keep_for = self.window * 2;

        entries.retain(|_, entry| now.duration_since(entry.window_start) < keep_for);
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.entries.lock().await.len()
    }
}

pub fn spawn_cleanup_worker(limiter: RateLimitState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(CLEANUP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            limiter.cleanup().await;
            tracing::debug!("Rate limit entries pruned");
        }
    });
}

/// Per-user limit on completion logging. Runs inside `require_auth`.
pub async fn rate_limit_logging(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = format!("log:{}", session.user_id);

    match state.rate_limiter.check(&key).await {
        Ok(remaining) => {
            tracing::debug!(user_id = %session.user_id, remaining = remaining, "Rate limit check passed");
            Ok(next.run(req).await)
        }
        Err(retry_after) => {
            tracing::warn!(
                user_id = %session.user_id,
                retry_after_secs = retry_after.as_secs(),
                "Completion logging rate limit exceeded"
            );
            Err(AppError::RateLimited)
        }
    }
}
