use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CompletionRecord {
    pub id: i64,
    pub user_id: Uuid,
    pub workout_id: Option<i64>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct LogCompletionRequest {
    pub workout_id: Option<i64>,
    /// Defaults to now. Must be within the last day.
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ActiveDaysQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}
