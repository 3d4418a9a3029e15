//! # Exercise catalog handlers
//!
//! ## Endpoints
//! - `GET  /api/v1/exercises?q=&muscle_group=` → search the catalog
//! - `POST /api/v1/exercises`                  → add an entry (trainers)
//! - `GET  /api/v1/exercises/{id}`             → one entry

use crate::{
    db,
    error::AppError,
    middleware::{
        auth::{AuthUser, TrainerUser},
        json::ValidJson,
    },
    models::*,
    response::{created, ok, ApiResponse},
    routes::{parse_id, AppState},
};
use axum::extract::{Path, Query, State};

pub async fn list_exercises(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ExerciseQuery>,
) -> Result<ApiResponse<Vec<CatalogExercise>>, AppError> {
    Ok(ok(db::exercises::list_exercises(&state.pool, &query).await?))
}

pub async fn create_exercise(
    State(state): State<AppState>,
    trainer: TrainerUser,
    ValidJson(req): ValidJson<CreateExerciseRequest>,
) -> Result<ApiResponse<CatalogExercise>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::invalid("name", "must not be empty"));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let exercise = db::exercises::create_exercise(&state.pool, &id, &trainer.user_id, &req).await?;
    tracing::info!(exercise_id = %exercise.id, "catalog exercise created");

    Ok(created(exercise))
}

pub async fn get_exercise(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<CatalogExercise>, AppError> {
    let id = parse_id(&id, "exercise")?;
    let exercise = db::exercises::get_exercise(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("exercise"))?;
    Ok(ok(exercise))
}
