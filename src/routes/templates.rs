//! # Template handlers
//!
//! ## Endpoints
//! - `GET    /api/v1/templates`              → list (filter by category, difficulty, tag)
//! - `POST   /api/v1/templates`              → create from a tree or N empty weeks
//! - `GET    /api/v1/templates/{id}`         → template with its tree
//! - `PATCH  /api/v1/templates/{id}`         → metadata
//! - `DELETE /api/v1/templates/{id}`         → delete with its assignments
//! - `PUT    /api/v1/templates/{id}/tree`    → replace the whole tree
//! - `POST   /api/v1/templates/{id}/weeks`   → append a week
//! - `POST   .../weeks/{week}/days/{day}/sessions`                       → add session
//! - `DELETE .../weeks/{week}/days/{day}/sessions/{session}`             → remove session
//! - `POST   .../weeks/{week}/days/{day}/sessions/{session}/exercises`   → add exercise
//! - `POST   /api/v1/templates/{id}/clone`   → deep copy with fresh ids
//! - `POST   /api/v1/templates/{id}/assign`  → assign a client, materializing a planning
//! - `GET    /api/v1/templates/{id}/clients` → assignments
//! - `DELETE /api/v1/templates/{id}/clients/{client_id}`               → unassign
//! - `PATCH  /api/v1/templates/{id}/clients/{client_id}/progress`      → progress
//! - `PATCH  /api/v1/templates/{id}/clients/{client_id}/exercises`     → log a set change
//! - `GET    /api/v1/templates/{id}/clients/{client_id}/modifications` → read the log

use crate::{
    db::{self, plannings::NewPlanning, templates::TemplateFields},
    error::AppError,
    middleware::{auth::TrainerUser, json::ValidJson},
    models::*,
    response::{created, ok, ApiResponse},
    routes::{parse_day, parse_id, parse_selector, parse_week, AppState},
    services::calendar,
    tree::{
        ops::MAX_WEEKS, Exercise, Level, NewExercise, NewSession, NodePath, PlanTree, Selector,
        Session, Week,
    },
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use std::collections::HashSet;

/// Slugified, deduplicated, in the order given.
fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|t| slug::slugify(t))
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

fn non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::invalid(field, "must not be empty"));
    }
    Ok(())
}

/// Every catalog exercise the tree references must exist.
async fn ensure_catalog<'a>(
    state: &AppState,
    ids: impl IntoIterator<Item = &'a str>,
) -> Result<(), AppError> {
    let missing = db::exercises::missing_ids(&state.pool, ids).await?;
    if !missing.is_empty() {
        return Err(AppError::not_found(format!("exercise {}", missing.join(", "))));
    }
    Ok(())
}

fn exercise_ids(tree: &PlanTree) -> impl Iterator<Item = &str> {
    tree.weeks
        .iter()
        .flat_map(|w| w.days.values())
        .flat_map(|d| d.sessions.iter())
        .flat_map(|s| s.exercises.iter())
        .map(|e| e.exercise_id.as_str())
}

// ── CRUD ──

pub async fn list_templates(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Query(query): Query<TemplateQuery>,
) -> Result<ApiResponse<Vec<TemplateSummary>>, AppError> {
    let templates = db::templates::list_templates(&state.pool, &trainer.user_id, &query).await?;
    Ok(ok(templates))
}

pub async fn create_template(
    State(state): State<AppState>,
    trainer: TrainerUser,
    ValidJson(req): ValidJson<CreateTemplateRequest>,
) -> Result<ApiResponse<PlanningTemplate>, AppError> {
    non_empty("name", &req.name)?;

    let tree = match req.tree {
        Some(mut tree) => {
            tree.validate()?;
            if tree.weeks.len() as u32 > MAX_WEEKS {
                return Err(AppError::invalid(
                    "tree.weeks",
                    format!("a template holds at most {} weeks", MAX_WEEKS),
                ));
            }
            ensure_catalog(&state, exercise_ids(&tree)).await?;
            tree
        }
        None => {
            let weeks = req.total_weeks.unwrap_or(1);
            if !(1..=MAX_WEEKS).contains(&weeks) {
                return Err(AppError::invalid(
                    "total_weeks",
                    format!("must be between 1 and {}", MAX_WEEKS),
                ));
            }
            PlanTree::scaffold(None, weeks)
        }
    };

    let tags = normalize_tags(&req.tags);
    let id = uuid::Uuid::now_v7().to_string();
    let template = db::templates::create_template(
        &state.pool,
        &id,
        &trainer.user_id,
        &TemplateFields {
            name: req.name.trim(),
            description: req.description.as_deref(),
            category: req.category.as_deref(),
            difficulty: req.difficulty,
            tags: &tags,
        },
        &tree,
    )
    .await?;
    tracing::info!(template_id = %id, weeks = template.total_weeks, "template created");

    Ok(created(template))
}

pub async fn get_template(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<PlanningTemplate>, AppError> {
    let id = parse_id(&id, "template")?;
    let template = db::templates::owned_template(&state.pool, &trainer.user_id, &id).await?;
    Ok(ok(template))
}

pub async fn update_template(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdateTemplateRequest>,
) -> Result<ApiResponse<PlanningTemplate>, AppError> {
    let id = parse_id(&id, "template")?;
    let current = db::templates::owned_template(&state.pool, &trainer.user_id, &id).await?;

    if let Some(name) = &req.name {
        non_empty("name", name)?;
    }
    let tags = match &req.tags {
        Some(tags) => normalize_tags(tags),
        None => current.tags.0.clone(),
    };
    let fields = TemplateFields {
        name: req.name.as_deref().map(str::trim).unwrap_or(&current.name),
        description: req.description.as_deref().or(current.description.as_deref()),
        category: req.category.as_deref().or(current.category.as_deref()),
        difficulty: req.difficulty.or(current.difficulty),
        tags: &tags,
    };

    let template = db::templates::update_metadata(&state.pool, &id, &fields).await?;
    Ok(ok(template))
}

/// Assignments and their modification logs go with the template; the
/// plannings already materialized for clients stay.
pub async fn delete_template(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "template")?;
    db::templates::owned_template(&state.pool, &trainer.user_id, &id).await?;

    db::templates::delete_template(&state.pool, &id).await?;
    tracing::info!(template_id = %id, "template deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ── Tree edits ──

pub async fn replace_tree(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
    ValidJson(mut tree): ValidJson<PlanTree>,
) -> Result<ApiResponse<PlanningTemplate>, AppError> {
    let id = parse_id(&id, "template")?;
    tree.validate()?;
    if tree.weeks.len() as u32 > MAX_WEEKS {
        return Err(AppError::invalid(
            "weeks",
            format!("a template holds at most {} weeks", MAX_WEEKS),
        ));
    }
    ensure_catalog(&state, exercise_ids(&tree)).await?;

    let (_, template) = db::templates::edit_template(&state.pool, &trainer.user_id, &id, |current| {
        *current = tree;
        Ok(())
    })
    .await?;

    Ok(ok(template))
}

pub async fn add_week(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<Week>, AppError> {
    let id = parse_id(&id, "template")?;
    let (week, _) = db::templates::edit_template(&state.pool, &trainer.user_id, &id, |tree| {
        if tree.weeks.len() as u32 >= MAX_WEEKS {
            return Err(AppError::invalid(
                "weeks",
                format!("a template holds at most {} weeks", MAX_WEEKS),
            ));
        }
        Ok(tree.append_week(None).clone())
    })
    .await?;

    Ok(created(week))
}

pub async fn add_session(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path((id, week, day)): Path<(String, String, String)>,
    ValidJson(req): ValidJson<NewSession>,
) -> Result<ApiResponse<Session>, AppError> {
    let id = parse_id(&id, "template")?;
    let path = NodePath::day(parse_week(&week)?, parse_day(&day)?);

    let (session, _) = db::templates::edit_template(&state.pool, &trainer.user_id, &id, |tree| {
        Ok(tree.add_session(&path, req)?.clone())
    })
    .await?;

    Ok(created(session))
}

pub async fn delete_session(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path((id, week, day, session)): Path<(String, String, String, String)>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "template")?;
    let path = NodePath::day(parse_week(&week)?, parse_day(&day)?)
        .session(parse_selector(&session, Level::Session)?);

    db::templates::edit_template(&state.pool, &trainer.user_id, &id, |tree| {
        Ok(tree.remove_session(&path)?)
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_exercise(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path((id, week, day, session)): Path<(String, String, String, String)>,
    ValidJson(mut req): ValidJson<NewExercise>,
) -> Result<ApiResponse<Exercise>, AppError> {
    let id = parse_id(&id, "template")?;
    let path = NodePath::day(parse_week(&week)?, parse_day(&day)?)
        .session(parse_selector(&session, Level::Session)?);
    req.exercise_id = parse_id(&req.exercise_id, "exercise")?;
    ensure_catalog(&state, [req.exercise_id.as_str()]).await?;

    let (exercise, _) = db::templates::edit_template(&state.pool, &trainer.user_id, &id, |tree| {
        Ok(tree.add_exercise(&path, req)?.clone())
    })
    .await?;

    Ok(created(exercise))
}

// ── Cloning ──

pub async fn clone_template(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<CloneTemplateRequest>,
) -> Result<ApiResponse<PlanningTemplate>, AppError> {
    let id = parse_id(&id, "template")?;
    let source = db::templates::owned_template(&state.pool, &trainer.user_id, &id).await?;

    let name = match req.name.as_deref().map(str::trim) {
        Some("") => return Err(AppError::invalid("name", "must not be empty")),
        Some(name) => name.to_string(),
        None => format!("{} (copy)", source.name),
    };

    let copy_id = uuid::Uuid::now_v7().to_string();
    let copy = db::templates::create_template(
        &state.pool,
        &copy_id,
        &trainer.user_id,
        &TemplateFields {
            name: &name,
            description: source.description.as_deref(),
            category: source.category.as_deref(),
            difficulty: source.difficulty,
            tags: &source.tags.0,
        },
        &source.tree.0.with_fresh_ids(),
    )
    .await?;
    tracing::info!(source_id = %id, template_id = %copy_id, "template cloned");

    Ok(created(copy))
}

// ── Assignments ──

/// Assigns the client and materializes the template as a planning for it,
/// starting on the next Monday after today.
pub async fn assign_client(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<AssignClientRequest>,
) -> Result<ApiResponse<Assignment>, AppError> {
    let id = parse_id(&id, "template")?;
    let client_id = parse_id(&req.client_id, "client")?;
    let template = db::templates::owned_template(&state.pool, &trainer.user_id, &id).await?;
    db::clients::owned_client(&state.pool, &trainer.user_id, &client_id).await?;

    if db::templates::find_assignment(&state.pool, &id, &client_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Client is already assigned to this template".to_string(),
        ));
    }
    if template.tree.0.weeks.is_empty() {
        return Err(AppError::invalid("tree", "template has no weeks to assign"));
    }

    let anchor = calendar::next_monday_after(Utc::now().date_naive());
    let tree = template.tree.0.instantiate(anchor);
    let planning_id = uuid::Uuid::now_v7().to_string();
    let assignment_id = uuid::Uuid::now_v7().to_string();

    let mut tx = db::begin_write(&state.pool).await?;
    db::plannings::insert_planning(
        &mut tx,
        &NewPlanning {
            id: &planning_id,
            trainer_id: &trainer.user_id,
            client_id: &client_id,
            name: &template.name,
            description: template.description.as_deref(),
            goal: None,
            start_date: anchor,
            kind: PlanningKind::TemplateInstance,
            template_id: Some(template.id.as_str()),
        },
        &tree,
    )
    .await?;
    let assignment =
        db::templates::insert_assignment(&mut tx, &assignment_id, &id, &client_id, &planning_id)
            .await
            .map_err(|e| match e {
                AppError::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    AppError::Conflict("Client is already assigned to this template".to_string())
                }
                other => other,
            })?;
    tx.commit().await?;
    tracing::info!(
        template_id = %id,
        client_id = %client_id,
        planning_id = %planning_id,
        start = %anchor,
        "template assigned"
    );

    Ok(created(assignment))
}

pub async fn list_assignments(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<Assignment>>, AppError> {
    let id = parse_id(&id, "template")?;
    db::templates::owned_template(&state.pool, &trainer.user_id, &id).await?;

    Ok(ok(db::templates::list_assignments(&state.pool, &id).await?))
}

/// Assignment of `client_id` to a template the trainer owns, or 404.
async fn owned_assignment(
    state: &AppState,
    trainer_id: &str,
    template_id: &str,
    client_id: &str,
) -> Result<(PlanningTemplate, Assignment), AppError> {
    let template_id = parse_id(template_id, "template")?;
    let client_id = parse_id(client_id, "client")?;
    let template = db::templates::owned_template(&state.pool, trainer_id, &template_id).await?;
    let assignment = db::templates::find_assignment(&state.pool, &template_id, &client_id)
        .await?
        .ok_or_else(|| AppError::not_found("assignment"))?;
    Ok((template, assignment))
}

/// The materialized planning is kept.
pub async fn unassign_client(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path((id, client_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let (_, assignment) = owned_assignment(&state, &trainer.user_id, &id, &client_id).await?;

    db::templates::delete_assignment(&state.pool, &assignment.id).await?;
    tracing::info!(template_id = %assignment.template_id, client_id = %assignment.client_id, "client unassigned");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_progress(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path((id, client_id)): Path<(String, String)>,
    ValidJson(req): ValidJson<ProgressRequest>,
) -> Result<ApiResponse<Assignment>, AppError> {
    let (template, mut assignment) =
        owned_assignment(&state, &trainer.user_id, &id, &client_id).await?;

    if let Some(week) = req.current_week {
        let last = template.total_weeks.max(1);
        if !(1..=last).contains(&week) {
            return Err(AppError::invalid(
                "current_week",
                format!("must be between 1 and {}", last),
            ));
        }
        assignment.current_week = week;
    }
    if let Some(day) = req.current_day {
        if !(1..=7).contains(&day) {
            return Err(AppError::invalid("current_day", "must be between 1 and 7"));
        }
        assignment.current_day = day;
    }
    if let Some(status) = req.status {
        assignment.status = status;
    }

    Ok(ok(db::templates::update_progress(&state.pool, &assignment).await?))
}

fn selector(input: SelectorInput, level: Level) -> Result<Selector, AppError> {
    match input {
        SelectorInput::Index(i) => Ok(Selector::Index(i)),
        SelectorInput::Text(raw) => parse_selector(&raw, level),
    }
}

/// Records a per-client change of one set field. The template tree is only
/// read, to capture the value being replaced.
pub async fn modify_client_exercise(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path((id, client_id)): Path<(String, String)>,
    ValidJson(req): ValidJson<ModifyExerciseRequest>,
) -> Result<ApiResponse<Modification>, AppError> {
    let (template, assignment) =
        owned_assignment(&state, &trainer.user_id, &id, &client_id).await?;

    if !req.value.is_finite() || req.value < 0.0 {
        return Err(AppError::invalid("value", "must be a non-negative number"));
    }
    if req.week < 1 {
        return Err(AppError::invalid("week", "must be a positive week number"));
    }
    let day = parse_day(&req.day)?;
    let path = NodePath::day(req.week, day)
        .session(selector(req.session, Level::Session)?)
        .exercise(selector(req.exercise, Level::Exercise)?)
        .set(selector(req.set, Level::Set)?);

    let tree = &template.tree.0;
    let exercise = tree.exercise(&path)?;
    let set = tree.set(&path)?;

    let modification = Modification {
        id: uuid::Uuid::now_v7().to_string(),
        assignment_id: assignment.id,
        week_number: i64::from(req.week),
        day_name: day.to_string(),
        exercise_node_id: exercise.id.clone(),
        set_id: set.id.clone(),
        field: req.field,
        old_value: set.values.get(req.field),
        new_value: req.value,
        created_at: db::now_timestamp(),
    };
    db::templates::insert_modification(&state.pool, &modification).await?;
    tracing::info!(
        assignment_id = %modification.assignment_id,
        field = %req.field.as_str(),
        "client exercise modified"
    );

    Ok(created(modification))
}

pub async fn list_modifications(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path((id, client_id)): Path<(String, String)>,
) -> Result<ApiResponse<Vec<Modification>>, AppError> {
    let (_, assignment) = owned_assignment(&state, &trainer.user_id, &id, &client_id).await?;
    Ok(ok(db::templates::list_modifications(&state.pool, &assignment.id).await?))
}
