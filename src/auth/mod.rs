//! Request identity.
//!
//! Tokens are issued by the account service; this API only verifies them.
//! `main` picks the single [`AuthProvider`] implementation at startup and
//! `require_auth` turns a verified bearer token into a [`Session`] that is
//! handed to every handler through request extensions.

pub mod jwt;
pub mod middleware;
pub mod rate_limit;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;

/// Identity of the caller for the lifetime of one request.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub expires_at: DateTime<Utc>,
}

pub trait AuthProvider: Send + Sync {
    /// Verify a raw bearer token. Any failure is `AppError::Unauthorized`.
    fn authenticate(&self, bearer_token: &str) -> AppResult<Session>;
}
