//! # Skeleton (Esqueleto) handlers
//!
//! ## Endpoints
//! - `GET    /api/v1/esqueletos`        → list
//! - `POST   /api/v1/esqueletos`        → create with N weeks of 7 days
//! - `GET    /api/v1/esqueletos/{id}`   → skeleton with its tree
//! - `DELETE /api/v1/esqueletos/{id}`   → delete
//! - `POST   /api/v1/esqueletos/{id}/weeks` → append a week
//! - `POST   .../weeks/{week}/days/{day}/variants`                                  → add a color variant
//! - `POST   .../weeks/{week}/days/{day}/variants/{color}/sessions`                 → add a session
//! - `POST   .../weeks/{week}/days/{day}/variants/{color}/sessions/{session}/exercises` → add an exercise
//!
//! `{day}` is a day number (1 = Monday) or a day name.

use crate::{
    db,
    error::AppError,
    middleware::{auth::TrainerUser, json::ValidJson},
    models::*,
    response::{created, ok, ApiResponse},
    routes::{parse_day, parse_id, parse_selector, parse_week, AppState},
    tree::{
        ops::MAX_WEEKS,
        skeleton::{SkeletonTree, SkeletonWeek, Variant},
        Color, Exercise, Level, NewExercise, NewSession, Session,
    },
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
};

fn parse_day_number(raw: &str) -> Result<u8, AppError> {
    Ok(parse_day(raw)?.number())
}

fn parse_color(raw: &str) -> Result<Color, AppError> {
    raw.parse::<Color>().map_err(AppError::from)
}

pub async fn list_skeletons(
    State(state): State<AppState>,
    trainer: TrainerUser,
) -> Result<ApiResponse<Vec<SkeletonSummary>>, AppError> {
    Ok(ok(db::skeletons::list_skeletons(&state.pool, &trainer.user_id).await?))
}

pub async fn create_skeleton(
    State(state): State<AppState>,
    trainer: TrainerUser,
    ValidJson(req): ValidJson<CreateSkeletonRequest>,
) -> Result<ApiResponse<Skeleton>, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::invalid("name", "must not be empty"));
    }
    if !(1..=MAX_WEEKS).contains(&req.weeks) {
        return Err(AppError::invalid(
            "weeks",
            format!("must be between 1 and {}", MAX_WEEKS),
        ));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let skeleton = db::skeletons::create_skeleton(
        &state.pool,
        &id,
        &trainer.user_id,
        name,
        req.description.as_deref(),
        &SkeletonTree::scaffold(req.weeks),
    )
    .await?;
    tracing::info!(skeleton_id = %id, weeks = req.weeks, "skeleton created");

    Ok(created(skeleton))
}

pub async fn get_skeleton(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<Skeleton>, AppError> {
    let id = parse_id(&id, "skeleton")?;
    Ok(ok(db::skeletons::owned_skeleton(&state.pool, &trainer.user_id, &id).await?))
}

pub async fn delete_skeleton(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "skeleton")?;
    db::skeletons::owned_skeleton(&state.pool, &trainer.user_id, &id).await?;
    db::skeletons::delete_skeleton(&state.pool, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_week(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<SkeletonWeek>, AppError> {
    let id = parse_id(&id, "skeleton")?;
    let week = db::skeletons::edit_skeleton(&state.pool, &trainer.user_id, &id, |tree| {
        if tree.weeks.len() as u32 >= MAX_WEEKS {
            return Err(AppError::invalid(
                "weeks",
                format!("a skeleton holds at most {} weeks", MAX_WEEKS),
            ));
        }
        Ok(tree.append_week().clone())
    })
    .await?;

    Ok(created(week))
}

pub async fn add_variant(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path((id, week, day)): Path<(String, String, String)>,
    ValidJson(req): ValidJson<AddVariantRequest>,
) -> Result<ApiResponse<Variant>, AppError> {
    let id = parse_id(&id, "skeleton")?;
    let week = parse_week(&week)?;
    let day = parse_day_number(&day)?;

    let variant = db::skeletons::edit_skeleton(&state.pool, &trainer.user_id, &id, |tree| {
        Ok(tree.add_variant(week, day, req.color)?.clone())
    })
    .await?;

    Ok(created(variant))
}

pub async fn add_session(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path((id, week, day, color)): Path<(String, String, String, String)>,
    ValidJson(req): ValidJson<NewSession>,
) -> Result<ApiResponse<Session>, AppError> {
    let id = parse_id(&id, "skeleton")?;
    let week = parse_week(&week)?;
    let day = parse_day_number(&day)?;
    let color = parse_color(&color)?;

    let session = db::skeletons::edit_skeleton(&state.pool, &trainer.user_id, &id, |tree| {
        Ok(tree.add_session(week, day, color, req)?.clone())
    })
    .await?;

    Ok(created(session))
}

pub async fn add_exercise(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path((id, week, day, color, session)): Path<(String, String, String, String, String)>,
    ValidJson(mut req): ValidJson<NewExercise>,
) -> Result<ApiResponse<Exercise>, AppError> {
    let id = parse_id(&id, "skeleton")?;
    let week = parse_week(&week)?;
    let day = parse_day_number(&day)?;
    let color = parse_color(&color)?;
    let session = parse_selector(&session, Level::Session)?;

    req.exercise_id = parse_id(&req.exercise_id, "exercise")?;
    if db::exercises::get_exercise(&state.pool, &req.exercise_id)
        .await?
        .is_none()
    {
        return Err(AppError::not_found(format!("exercise {}", req.exercise_id)));
    }

    let exercise = db::skeletons::edit_skeleton(&state.pool, &trainer.user_id, &id, |tree| {
        Ok(tree.add_exercise(week, day, color, &session, req)?.clone())
    })
    .await?;

    Ok(created(exercise))
}
