use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Days, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::auth::Session;
use crate::dto::{
    ActiveDaysResponse, CalendarResponse, DayStatusResponse, LogCompletionResponse,
    WorkoutStreakResponse,
};
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::subscriptions::subscribed_workouts;
use crate::handlers::workouts::find_workout;
use crate::models::completion::{
    ActiveDaysQuery, CalendarQuery, CompletionRecord, LogCompletionRequest,
};
use crate::services::calendar::project_calendar;
use crate::services::streak::{
    compute_active_dates, compute_streak_summary, summaries_by_workout, StreakSummary,
};
use crate::AppState;

const MAX_BACKFILL_HOURS: i64 = 24;
const MAX_CLOCK_SKEW_MINUTES: i64 = 5;
const DEFAULT_RANGE_DAYS: u64 = 30;

pub async fn log_completion(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    AppJson(body): AppJson<LogCompletionRequest>,
) -> AppResult<Json<LogCompletionResponse>> {
    if let Some(workout_id) = body.workout_id {
        find_workout(&state.db, workout_id)
            .await?
            .ok_or(AppError::NotFound("Workout not found".into()))?;
    }

    let now = state.clock.now();
    let completed_at = body.completed_at.unwrap_or(now);
    validate_completed_at(completed_at, now)?;

    let completion = sqlx::query_as::<_, CompletionRecord>(
        r#"
        INSERT INTO completions (user_id, workout_id, completed_at)
        VALUES (?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(session.user_id)
    .bind(body.workout_id)
    .bind(completed_at)
    .fetch_one(&state.db)
    .await?;

    let summary = user_summary(&state, session.user_id, now).await?;

    tracing::info!(
        user_id = %session.user_id,
        workout_id = ?body.workout_id,
        current_streak = summary.current_streak,
        "Completion logged"
    );

    Ok(Json(LogCompletionResponse {
        completion,
        summary,
    }))
}

pub async fn get_stats(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<StreakSummary>> {
    let summary = user_summary(&state, session.user_id, state.clock.now()).await?;
    Ok(Json(summary))
}

/// Streaks for each subscribed workout. Workouts never logged report zeros.
pub async fn list_workout_streaks(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<Vec<WorkoutStreakResponse>>> {
    let workouts = subscribed_workouts(&state.db, session.user_id).await?;
    let records = load_records(&state.db, session.user_id).await?;
    let today = state.config.today_at(state.clock.now());

    let by_workout = summaries_by_workout(&records, &state.config.reporting_offset, today);
    let empty = StreakSummary::default();

    let streaks = workouts
        .iter()
        .map(|w| WorkoutStreakResponse::new(w, by_workout.get(&w.id).unwrap_or(&empty)))
        .collect();

    Ok(Json(streaks))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    AppQuery(query): AppQuery<CalendarQuery>,
) -> AppResult<Json<CalendarResponse>> {
    let days = query.days.unwrap_or(state.config.calendar_default_days);
    if days > state.config.calendar_max_days {
        return Err(AppError::Validation(format!(
            "days must be at most {}",
            state.config.calendar_max_days
        )));
    }

    let records = load_records(&state.db, session.user_id).await?;
    let active = compute_active_dates(&records, &state.config.reporting_offset);
    let today = state.config.today_at(state.clock.now());

    let entries = project_calendar(&active, today, days)?.collect();

    Ok(Json(CalendarResponse {
        today,
        days,
        entries,
    }))
}

pub async fn list_active_days(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    AppQuery(query): AppQuery<ActiveDaysQuery>,
) -> AppResult<Json<ActiveDaysResponse>> {
    let today = state.config.today_at(state.clock.now());
    let end = query.end.unwrap_or(today);
    let start = query.start.unwrap_or_else(|| {
        end.checked_sub_days(Days::new(DEFAULT_RANGE_DAYS - 1))
            .unwrap_or(NaiveDate::MIN)
    });

    let records = load_records(&state.db, session.user_id).await?;
    let active = compute_active_dates(&records, &state.config.reporting_offset);
    let dates = active.in_range(start, end)?;

    Ok(Json(ActiveDaysResponse { start, end, dates }))
}

pub async fn get_day_status(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    AppPath(date): AppPath<NaiveDate>,
) -> AppResult<Json<DayStatusResponse>> {
    let records = load_records(&state.db, session.user_id).await?;
    let active = compute_active_dates(&records, &state.config.reporting_offset);

    Ok(Json(DayStatusResponse {
        date,
        active: active.contains(date),
    }))
}

async fn load_records(db: &sqlx::SqlitePool, user_id: Uuid) -> AppResult<Vec<CompletionRecord>> {
    let records = sqlx::query_as::<_, CompletionRecord>(
        "SELECT * FROM completions WHERE user_id = ? ORDER BY completed_at ASC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(records)
}

async fn user_summary(
    state: &AppState,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<StreakSummary> {
    let records = load_records(&state.db, user_id).await?;
    let active = compute_active_dates(&records, &state.config.reporting_offset);
    let today = state.config.today_at(now);

    tracing::debug!(
        user_id = %user_id,
        records = records.len(),
        active_days = active.len(),
        %today,
        "Computing streak summary"
    );

    Ok(compute_streak_summary(active, today, records.len() as u64))
}

fn validate_completed_at(completed_at: DateTime<Utc>, now: DateTime<Utc>) -> AppResult<()> {
    if completed_at > now + Duration::minutes(MAX_CLOCK_SKEW_MINUTES) {
        return Err(AppError::Validation(
            "completed_at must not be in the future".into(),
        ));
    }
    if now - completed_at > Duration::hours(MAX_BACKFILL_HOURS) {
        return Err(AppError::Validation(
            "completed_at must be within the last 24 hours".into(),
        ));
    }
    Ok(())
}
