//! Response bodies.
//!
//! Request bodies and query params live next to their rows in `models`;
//! this module holds the JSON shapes handed back to the SPA.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::completion::CompletionRecord;
use crate::models::workout::Workout;
use crate::services::calendar::CalendarDay;
use crate::services::streak::StreakSummary;

// ============================================================================
// Subscriptions
// ============================================================================

/// POST /api/subscriptions
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub workout: Workout,
    pub subscribed_at: DateTime<Utc>,
}

/// DELETE /api/subscriptions/{workout_id}
#[derive(Debug, Serialize)]
pub struct UnsubscribeResponse {
    pub deleted: bool,
    pub workout_id: i64,
}

// ============================================================================
// Completions & streaks
// ============================================================================

/// POST /api/completions: the stored record plus the recomputed aggregate
#[derive(Debug, Serialize)]
pub struct LogCompletionResponse {
    pub completion: CompletionRecord,
    pub summary: StreakSummary,
}

/// One entry of GET /api/streaks
#[derive(Debug, Serialize)]
pub struct WorkoutStreakResponse {
    pub workout_id: i64,
    pub workout_name: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completions: u64,
    pub today_logged: bool,
    pub last_active_date: Option<NaiveDate>,
}

impl WorkoutStreakResponse {
    pub fn new(workout: &Workout, summary: &StreakSummary) -> Self {
        Self {
            workout_id: workout.id,
            workout_name: workout.name.clone(),
            current_streak: summary.current_streak,
            longest_streak: summary.longest_streak,
            total_completions: summary.total_completions,
            today_logged: summary.today_logged,
            last_active_date: summary.last_active_date,
        }
    }
}

/// GET /api/streaks/calendar
#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub today: NaiveDate,
    pub days: u32,
    pub entries: Vec<CalendarDay>,
}

/// GET /api/streaks/active-days
#[derive(Debug, Serialize)]
pub struct ActiveDaysResponse {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub dates: Vec<NaiveDate>,
}

/// GET /api/streaks/days/{date}
#[derive(Debug, Serialize)]
pub struct DayStatusResponse {
    pub date: NaiveDate,
    pub active: bool,
}
