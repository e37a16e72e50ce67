use axum::{extract::State, Extension, Json};
use uuid::Uuid;

use crate::auth::Session;
use crate::dto::{SubscriptionResponse, UnsubscribeResponse};
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::workouts::find_workout;
use crate::models::subscription::{SubscribeRequest, Subscription};
use crate::models::workout::Workout;
use crate::AppState;

pub async fn list_subscriptions(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<Vec<Workout>>> {
    let workouts = subscribed_workouts(&state.db, session.user_id).await?;
    Ok(Json(workouts))
}

pub async fn subscribe(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    AppJson(body): AppJson<SubscribeRequest>,
) -> AppResult<Json<SubscriptionResponse>> {
    let workout = find_workout(&state.db, body.workout_id)
        .await?
        .ok_or(AppError::NotFound("Workout not found".into()))?;

    // The primary key arbitrates concurrent subscribes: the loser gets no row.
    let subscription = sqlx::query_as::<_, Subscription>(
        r#"
        INSERT INTO subscriptions (user_id, workout_id, subscribed_at)
        VALUES (?, ?, ?)
        ON CONFLICT (user_id, workout_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(session.user_id)
    .bind(workout.id)
    .bind(state.clock.now())
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::Conflict("Already subscribed to this workout".into()))?;

    tracing::info!(user_id = %session.user_id, workout_id = workout.id, "Subscribed to workout");

    Ok(Json(SubscriptionResponse {
        workout,
        subscribed_at: subscription.subscribed_at,
    }))
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    AppPath(workout_id): AppPath<i64>,
) -> AppResult<Json<UnsubscribeResponse>> {
    let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = ? AND workout_id = ?")
        .bind(session.user_id)
        .bind(workout_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Subscription not found".into()));
    }

    tracing::info!(user_id = %session.user_id, workout_id = workout_id, "Unsubscribed from workout");

    Ok(Json(UnsubscribeResponse {
        deleted: true,
        workout_id,
    }))
}

pub async fn subscribed_workouts(db: &sqlx::SqlitePool, user_id: Uuid) -> AppResult<Vec<Workout>> {
    let workouts = sqlx::query_as::<_, Workout>(
        r#"
        SELECT w.* FROM workouts w
        JOIN subscriptions s ON s.workout_id = w.id
        WHERE s.user_id = ?
        ORDER BY s.subscribed_at ASC, w.id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(workouts)
}
