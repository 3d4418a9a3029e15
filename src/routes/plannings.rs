//! # Planning handlers
//!
//! ## Endpoints
//! - `GET    /api/v1/plannings`                                → list
//! - `POST   /api/v1/plannings`                                → create with N empty weeks
//! - `GET    /api/v1/plannings/{id}`                           → populated read
//! - `DELETE /api/v1/plannings/{id}`                           → cascade delete
//! - `POST   /api/v1/plannings/{id}/anadirsemanasiguiente`     → append the next week
//! - `GET    /api/v1/plannings/{id}/weeks/{week}/days/{day}`   → one day
//! - `POST   /api/v1/plannings/session`                        → add a session to a day
//! - `PATCH  /api/v1/plannings/session/{session_id}`           → rename / change kind or rounds
//! - `DELETE /api/v1/plannings/session/{session_id}`           → cascade delete a session
//! - `POST   /api/v1/plannings/session/{session_id}/exercise`  → add an exercise with its sets
//! - `PUT    .../sessions/{session}/exercises/{exercise}`      → replace all sets
//! - `DELETE .../sessions/{session}/exercises/{exercise}`      → delete an exercise
//! - `PATCH  .../exercises/{exercise}/sets/{set}/render-config` → display slots of a set
//! - `GET    /api/v1/plannings/sets/{set_id}/checkins`         → check-ins of a set
//! - `POST   /api/v1/plannings/sets/{set_id}/checkins`         → add a check-in
//!
//! `{session}`, `{exercise}` and `{set}` take a 0-based index or a node id.
//! Every edit goes through [`db::plannings::edit_tree`]: load, locate,
//! mutate, write the row difference, all in one transaction.
//!
//! Trainers own plannings. The client account linked to a planning's client
//! may read it and add check-ins.

use crate::{
    db::{
        self,
        plannings::{Access, NewPlanning},
    },
    error::AppError,
    middleware::{
        auth::{AuthUser, TrainerUser},
        json::ValidJson,
    },
    models::*,
    response::{created, ok, ApiResponse},
    routes::{parse_day, parse_id, parse_selector, parse_week, AppState},
    tree::{
        ops::MAX_WEEKS, CheckIn, Day, DayName, Exercise, Level, NewCheckIn, NewExercise, NodePath,
        PlanTree, RenderConfigPatch, Session, SessionPatch, Set, Week,
    },
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DayPathParams {
    id: String,
    week: String,
    day: String,
}

#[derive(Debug, Deserialize)]
pub struct ExercisePathParams {
    id: String,
    week: String,
    day: String,
    session: String,
    exercise: String,
}

#[derive(Debug, Deserialize)]
pub struct SetPathParams {
    id: String,
    week: String,
    day: String,
    session: String,
    exercise: String,
    set: String,
}

impl ExercisePathParams {
    fn resolve(&self) -> Result<(String, NodePath), AppError> {
        let path = NodePath::day(parse_week(&self.week)?, parse_day(&self.day)?)
            .session(parse_selector(&self.session, Level::Session)?)
            .exercise(parse_selector(&self.exercise, Level::Exercise)?);
        Ok((parse_id(&self.id, "planning")?, path))
    }
}

impl SetPathParams {
    fn resolve(&self) -> Result<(String, NodePath), AppError> {
        let path = NodePath::day(parse_week(&self.week)?, parse_day(&self.day)?)
            .session(parse_selector(&self.session, Level::Session)?)
            .exercise(parse_selector(&self.exercise, Level::Exercise)?)
            .set(parse_selector(&self.set, Level::Set)?);
        Ok((parse_id(&self.id, "planning")?, path))
    }
}

/// A located day with its position in the plan.
#[derive(Debug, Serialize)]
pub struct LocatedDay {
    pub week_number: u32,
    pub day_name: DayName,
    #[serde(flatten)]
    pub day: Day,
}

// ── Plannings ──

pub async fn list_plannings(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<ApiResponse<Vec<Planning>>, AppError> {
    if user.is_trainer() {
        return Ok(ok(db::plannings::list_plannings(&state.pool, &user.user_id).await?));
    }

    let mut plannings = Vec::new();
    for client in db::clients::clients_of_user(&state.pool, &user.user_id).await? {
        plannings.extend(db::plannings::list_for_client(&state.pool, &client.id).await?);
    }
    Ok(ok(plannings))
}

pub async fn create_planning(
    State(state): State<AppState>,
    trainer: TrainerUser,
    ValidJson(req): ValidJson<CreatePlanningRequest>,
) -> Result<ApiResponse<PlanningDetail>, AppError> {
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
    let client_id = parse_id(&req.client_id, "client")?;
    db::clients::owned_client(&state.pool, &trainer.user_id, &client_id).await?;

    let id = uuid::Uuid::now_v7().to_string();
    let tree = PlanTree::scaffold(Some(req.start_date), req.weeks);
    let planning = db::plannings::create_planning(
        &state.pool,
        &NewPlanning {
            id: &id,
            trainer_id: &trainer.user_id,
            client_id: &client_id,
            name,
            description: req.description.as_deref(),
            goal: req.goal.as_deref(),
            start_date: req.start_date,
            kind: PlanningKind::Plan,
            template_id: None,
        },
        &tree,
    )
    .await?;
    tracing::info!(planning_id = %id, client_id = %client_id, weeks = req.weeks, "planning created");

    Ok(created(PlanningDetail::new(planning, tree)))
}

pub async fn get_planning(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<PlanningDetail>, AppError> {
    let id = parse_id(&id, "planning")?;
    let (planning, tree) =
        db::plannings::read_tree(&state.pool, &id, Access::OwnerOrClient(&user)).await?;
    Ok(ok(PlanningDetail::new(planning, tree)))
}

pub async fn delete_planning(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "planning")?;

    let mut tx = db::begin_write(&state.pool).await?;
    db::plannings::authorize(&mut tx, &id, Access::Owner(&trainer.user_id)).await?;
    db::plannings::purge_planning(&mut tx, &id).await?;
    tx.commit().await?;
    tracing::info!(planning_id = %id, "planning deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_next_week(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<Week>, AppError> {
    let id = parse_id(&id, "planning")?;
    let week = db::plannings::edit_tree(
        &state.pool,
        &id,
        Access::Owner(&trainer.user_id),
        |planning, tree| {
            if tree.weeks.len() as u32 >= MAX_WEEKS {
                return Err(AppError::invalid(
                    "weeks",
                    format!("a planning holds at most {} weeks", MAX_WEEKS),
                ));
            }
            Ok(tree.append_week(Some(planning.start_date)).clone())
        },
    )
    .await?;
    tracing::info!(planning_id = %id, week = week.number, "week appended");

    Ok(created(week))
}

pub async fn get_day(
    State(state): State<AppState>,
    user: AuthUser,
    Path(params): Path<DayPathParams>,
) -> Result<ApiResponse<LocatedDay>, AppError> {
    let id = parse_id(&params.id, "planning")?;
    let path = NodePath::day(parse_week(&params.week)?, parse_day(&params.day)?);

    let (_, tree) = db::plannings::read_tree(&state.pool, &id, Access::OwnerOrClient(&user)).await?;
    let day = tree.day(&path)?.clone();

    Ok(ok(LocatedDay {
        week_number: path.week,
        day_name: path.day,
        day,
    }))
}

// ── Sessions ──

pub async fn create_session(
    State(state): State<AppState>,
    trainer: TrainerUser,
    ValidJson(req): ValidJson<CreateSessionRequest>,
) -> Result<ApiResponse<Session>, AppError> {
    let planning_id = parse_id(&req.planning_id, "planning")?;
    if req.week < 1 {
        return Err(AppError::invalid("week", "must be a positive week number"));
    }
    let path = NodePath::day(req.week, parse_day(&req.day)?);

    let session = db::plannings::edit_tree(
        &state.pool,
        &planning_id,
        Access::Owner(&trainer.user_id),
        |_, tree| Ok(tree.add_session(&path, req.session)?.clone()),
    )
    .await?;
    tracing::info!(planning_id = %planning_id, session_id = %session.id, "session created");

    Ok(created(session))
}

/// Planning holding the session, or 404.
async fn session_planning(state: &AppState, session_id: &str) -> Result<String, AppError> {
    db::plannings::planning_of_session(&state.pool, session_id)
        .await?
        .ok_or_else(|| AppError::not_found("session"))
}

fn locate_session(tree: &PlanTree, session_id: &str) -> Result<NodePath, AppError> {
    tree.find_session(session_id)
        .ok_or_else(|| AppError::not_found("session"))
}

pub async fn update_session(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(session_id): Path<String>,
    ValidJson(patch): ValidJson<SessionPatch>,
) -> Result<ApiResponse<Session>, AppError> {
    let session_id = parse_id(&session_id, "session")?;
    let planning_id = session_planning(&state, &session_id).await?;

    let session = db::plannings::edit_tree(
        &state.pool,
        &planning_id,
        Access::Owner(&trainer.user_id),
        |_, tree| {
            let path = locate_session(tree, &session_id)?;
            Ok(tree.update_session(&path, patch)?.clone())
        },
    )
    .await?;

    Ok(ok(session))
}

/// Removes the session with its exercises, sets and check-ins and unlinks it
/// from its day.
pub async fn delete_session(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let session_id = parse_id(&session_id, "session")?;
    let planning_id = session_planning(&state, &session_id).await?;

    let removed = db::plannings::edit_tree(
        &state.pool,
        &planning_id,
        Access::Owner(&trainer.user_id),
        |_, tree| {
            let path = locate_session(tree, &session_id)?;
            Ok(tree.remove_session(&path)?)
        },
    )
    .await?;
    tracing::info!(
        planning_id = %planning_id,
        session_id = %session_id,
        exercises = removed.exercises.len(),
        "session deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

// ── Exercises and sets ──

async fn ensure_catalog_exercise(state: &AppState, exercise: &mut NewExercise) -> Result<(), AppError> {
    exercise.exercise_id = parse_id(&exercise.exercise_id, "exercise")?;
    if db::exercises::get_exercise(&state.pool, &exercise.exercise_id)
        .await?
        .is_none()
    {
        return Err(AppError::not_found(format!(
            "exercise {}",
            exercise.exercise_id
        )));
    }
    Ok(())
}

pub async fn add_exercise(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(session_id): Path<String>,
    ValidJson(mut req): ValidJson<NewExercise>,
) -> Result<ApiResponse<Exercise>, AppError> {
    let session_id = parse_id(&session_id, "session")?;
    ensure_catalog_exercise(&state, &mut req).await?;
    let planning_id = session_planning(&state, &session_id).await?;

    let exercise = db::plannings::edit_tree(
        &state.pool,
        &planning_id,
        Access::Owner(&trainer.user_id),
        |_, tree| {
            let path = locate_session(tree, &session_id)?;
            Ok(tree.add_exercise(&path, req)?.clone())
        },
    )
    .await?;
    tracing::info!(planning_id = %planning_id, exercise_id = %exercise.id, sets = exercise.sets.len(), "exercise added");

    Ok(created(exercise))
}

/// Replaces every set of the exercise with the given list.
pub async fn replace_sets(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(params): Path<ExercisePathParams>,
    ValidJson(req): ValidJson<ReplaceSetsRequest>,
) -> Result<ApiResponse<Exercise>, AppError> {
    let (planning_id, path) = params.resolve()?;

    let exercise = db::plannings::edit_tree(
        &state.pool,
        &planning_id,
        Access::Owner(&trainer.user_id),
        |_, tree| Ok(tree.replace_sets(&path, req.sets)?.clone()),
    )
    .await?;

    Ok(ok(exercise))
}

pub async fn delete_exercise(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(params): Path<ExercisePathParams>,
) -> Result<StatusCode, AppError> {
    let (planning_id, path) = params.resolve()?;

    db::plannings::edit_tree(
        &state.pool,
        &planning_id,
        Access::Owner(&trainer.user_id),
        |_, tree| Ok(tree.remove_exercise(&path)?),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_render_config(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(params): Path<SetPathParams>,
    ValidJson(patch): ValidJson<RenderConfigPatch>,
) -> Result<ApiResponse<Set>, AppError> {
    let (planning_id, path) = params.resolve()?;

    let set = db::plannings::edit_tree(
        &state.pool,
        &planning_id,
        Access::Owner(&trainer.user_id),
        |_, tree| Ok(tree.update_render_config(&path, &patch)?.clone()),
    )
    .await?;

    Ok(ok(set))
}

// ── Check-ins ──

async fn set_planning(state: &AppState, set_id: &str) -> Result<String, AppError> {
    db::plannings::planning_of_set(&state.pool, set_id)
        .await?
        .ok_or_else(|| AppError::not_found("set"))
}

pub async fn list_check_ins(
    State(state): State<AppState>,
    user: AuthUser,
    Path(set_id): Path<String>,
) -> Result<ApiResponse<Vec<CheckIn>>, AppError> {
    let set_id = parse_id(&set_id, "set")?;
    let planning_id = set_planning(&state, &set_id).await?;

    let (_, tree) =
        db::plannings::read_tree(&state.pool, &planning_id, Access::OwnerOrClient(&user)).await?;
    let path = tree
        .find_set(&set_id)
        .ok_or_else(|| AppError::not_found("set"))?;

    Ok(ok(tree.set(&path)?.check_ins.clone()))
}

pub async fn add_check_in(
    State(state): State<AppState>,
    user: AuthUser,
    Path(set_id): Path<String>,
    ValidJson(req): ValidJson<NewCheckIn>,
) -> Result<ApiResponse<CheckIn>, AppError> {
    let set_id = parse_id(&set_id, "set")?;
    let planning_id = set_planning(&state, &set_id).await?;

    let check_in = db::plannings::edit_tree(
        &state.pool,
        &planning_id,
        Access::OwnerOrClient(&user),
        |_, tree| {
            let path = tree
                .find_set(&set_id)
                .ok_or_else(|| AppError::not_found("set"))?;
            Ok(tree.add_check_in(&path, req, Utc::now())?.clone())
        },
    )
    .await?;
    tracing::info!(set_id = %set_id, user_id = %user.user_id, color = %check_in.color, "check-in added");

    Ok(created(check_in))
}
