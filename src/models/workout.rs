use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workout {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: Option<i64>,
    pub difficulty: Option<Difficulty>,
    pub source: WorkoutSource,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Where a catalog entry came from. External entries are copies of
/// exercise-database results saved by the client.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorkoutSource {
    #[default]
    Local,
    External,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkoutRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 2000, message = "Description must be under 2000 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 600, message = "Duration must be 1-600 minutes"))]
    pub duration_minutes: Option<i64>,
    pub difficulty: Option<Difficulty>,
    pub source: Option<WorkoutSource>,
}
