use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Subscription {
    pub user_id: Uuid,
    pub workout_id: i64,
    pub subscribed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub workout_id: i64,
}
