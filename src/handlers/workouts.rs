use axum::{extract::State, Json};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::models::workout::{CreateWorkoutRequest, Workout};
use crate::AppState;

pub async fn list_workouts(State(state): State<AppState>) -> AppResult<Json<Vec<Workout>>> {
    let workouts = sqlx::query_as::<_, Workout>(
        "SELECT * FROM workouts ORDER BY name COLLATE NOCASE ASC, id ASC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(workouts))
}

pub async fn get_workout(
    State(state): State<AppState>,
    AppPath(workout_id): AppPath<i64>,
) -> AppResult<Json<Workout>> {
    let workout = find_workout(&state.db, workout_id)
        .await?
        .ok_or(AppError::NotFound("Workout not found".into()))?;

    Ok(Json(workout))
}

pub async fn create_workout(
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateWorkoutRequest>,
) -> AppResult<Json<Workout>> {
    body.validate()?;

    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Workout name is required".into()));
    }

    let workout = sqlx::query_as::<_, Workout>(
        r#"
        INSERT INTO workouts (name, description, duration_minutes, difficulty, source, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(&body.description)
    .bind(body.duration_minutes)
    .bind(body.difficulty)
    .bind(body.source.unwrap_or_default())
    .bind(state.clock.now())
    .fetch_one(&state.db)
    .await?;

    tracing::info!(workout_id = workout.id, name = %workout.name, "Workout created");

    Ok(Json(workout))
}

pub async fn find_workout(db: &sqlx::SqlitePool, workout_id: i64) -> AppResult<Option<Workout>> {
    let workout = sqlx::query_as::<_, Workout>("SELECT * FROM workouts WHERE id = ?")
        .bind(workout_id)
        .fetch_optional(db)
        .await?;

    Ok(workout)
}
