//! # Template queries
//!
//! Templates keep their week tree embedded in one JSON column, so a tree
//! edit is read → edit → write of a single row. Assignments and the
//! modification log live in their own tables.

use crate::error::AppError;
use crate::models::template::*;
use crate::tree::PlanTree;
use sqlx::types::Json;
use sqlx::{Executor, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, trainer_id, name, description, category, difficulty, tags, \
                       total_weeks, tree, created_at, updated_at";

const ASSIGNMENT_COLUMNS: &str = "id, template_id, client_id, planning_id, current_week, \
                                  current_day, status, assigned_at, updated_at";

/// Normalized template metadata ready to be written.
#[derive(Debug)]
pub struct TemplateFields<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub difficulty: Option<Difficulty>,
    pub tags: &'a [String],
}

pub async fn create_template(
    pool: &SqlitePool,
    id: &str,
    trainer_id: &str,
    fields: &TemplateFields<'_>,
    tree: &PlanTree,
) -> Result<PlanningTemplate, AppError> {
    sqlx::query(
        r#"
        INSERT INTO planning_templates
            (id, trainer_id, name, description, category, difficulty, tags, total_weeks, tree)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(trainer_id)
    .bind(fields.name)
    .bind(fields.description)
    .bind(fields.category)
    .bind(fields.difficulty)
    .bind(Json(fields.tags))
    .bind(tree.weeks.len() as i64)
    .bind(Json(tree))
    .execute(pool)
    .await?;

    get_template(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created template".to_string()))
}

pub async fn get_template<'e, E>(executor: E, id: &str) -> Result<Option<PlanningTemplate>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let template = sqlx::query_as::<_, PlanningTemplate>(&format!(
        "SELECT {} FROM planning_templates WHERE id = ?",
        COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(template)
}

/// Missing → 404, another trainer's → 403.
pub async fn owned_template<'e, E>(
    executor: E,
    trainer_id: &str,
    id: &str,
) -> Result<PlanningTemplate, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let template = get_template(executor, id)
        .await?
        .ok_or_else(|| AppError::not_found("template"))?;
    if template.trainer_id != trainer_id {
        return Err(AppError::Forbidden(
            "You do not have access to this template".to_string(),
        ));
    }
    Ok(template)
}

pub async fn list_templates(
    pool: &SqlitePool,
    trainer_id: &str,
    query: &TemplateQuery,
) -> Result<Vec<TemplateSummary>, AppError> {
    let mut builder = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT t.id, t.name, t.description, t.category, t.difficulty, t.tags, t.total_weeks,
               (SELECT COUNT(*) FROM template_assignments a WHERE a.template_id = t.id) AS assigned_clients,
               t.created_at, t.updated_at
        FROM planning_templates t
        WHERE t.trainer_id =
        "#,
    );
    builder.push_bind(trainer_id.to_string());
    if let Some(category) = &query.category {
        builder
            .push(" AND t.category = ")
            .push_bind(category.clone())
            .push(" COLLATE NOCASE");
    }
    if let Some(difficulty) = query.difficulty {
        builder.push(" AND t.difficulty = ").push_bind(difficulty);
    }
    if let Some(tag) = &query.tag {
        builder
            .push(" AND EXISTS (SELECT 1 FROM json_each(t.tags) WHERE json_each.value = ")
            .push_bind(slug::slugify(tag))
            .push(")");
    }
    builder.push(" ORDER BY t.updated_at DESC");

    let templates = builder
        .build_query_as::<TemplateSummary>()
        .fetch_all(pool)
        .await?;

    Ok(templates)
}

pub async fn update_metadata(
    pool: &SqlitePool,
    id: &str,
    fields: &TemplateFields<'_>,
) -> Result<PlanningTemplate, AppError> {
    sqlx::query(
        r#"
        UPDATE planning_templates
        SET name = ?, description = ?, category = ?, difficulty = ?, tags = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(fields.name)
    .bind(fields.description)
    .bind(fields.category)
    .bind(fields.difficulty)
    .bind(Json(fields.tags))
    .bind(id)
    .execute(pool)
    .await?;

    get_template(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("template"))
}

pub async fn save_tree(conn: &mut SqliteConnection, id: &str, tree: &PlanTree) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE planning_templates
        SET tree = ?, total_weeks = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(Json(tree))
    .bind(tree.weeks.len() as i64)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Read → edit → write of the embedded tree in one transaction. Returns the
/// edit's result and the saved template.
pub async fn edit_template<T>(
    pool: &SqlitePool,
    trainer_id: &str,
    id: &str,
    edit: impl FnOnce(&mut PlanTree) -> Result<T, AppError>,
) -> Result<(T, PlanningTemplate), AppError> {
    let mut tx = super::begin_write(pool).await?;
    let mut template = owned_template(&mut *tx, trainer_id, id).await?;

    let out = edit(&mut template.tree.0)?;
    save_tree(&mut tx, id, &template.tree.0).await?;
    tx.commit().await?;

    template.total_weeks = template.tree.0.weeks.len() as i64;
    Ok((out, template))
}

pub async fn delete_template(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM planning_templates WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// ── Assignments ──

pub async fn find_assignment<'e, E>(
    executor: E,
    template_id: &str,
    client_id: &str,
) -> Result<Option<Assignment>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let assignment = sqlx::query_as::<_, Assignment>(&format!(
        "SELECT {} FROM template_assignments WHERE template_id = ? AND client_id = ?",
        ASSIGNMENT_COLUMNS
    ))
    .bind(template_id)
    .bind(client_id)
    .fetch_optional(executor)
    .await?;

    Ok(assignment)
}

pub async fn list_assignments(pool: &SqlitePool, template_id: &str) -> Result<Vec<Assignment>, AppError> {
    let assignments = sqlx::query_as::<_, Assignment>(&format!(
        "SELECT {} FROM template_assignments WHERE template_id = ? ORDER BY assigned_at",
        ASSIGNMENT_COLUMNS
    ))
    .bind(template_id)
    .fetch_all(pool)
    .await?;

    Ok(assignments)
}

pub async fn insert_assignment(
    conn: &mut SqliteConnection,
    id: &str,
    template_id: &str,
    client_id: &str,
    planning_id: &str,
) -> Result<Assignment, AppError> {
    sqlx::query(
        r#"
        INSERT INTO template_assignments (id, template_id, client_id, planning_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(template_id)
    .bind(client_id)
    .bind(planning_id)
    .execute(&mut *conn)
    .await?;

    find_assignment(&mut *conn, template_id, client_id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created assignment".to_string()))
}

pub async fn update_progress(
    pool: &SqlitePool,
    assignment: &Assignment,
) -> Result<Assignment, AppError> {
    sqlx::query(
        r#"
        UPDATE template_assignments
        SET current_week = ?, current_day = ?, status = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(assignment.current_week)
    .bind(assignment.current_day)
    .bind(assignment.status)
    .bind(&assignment.id)
    .execute(pool)
    .await?;

    find_assignment(pool, &assignment.template_id, &assignment.client_id)
        .await?
        .ok_or_else(|| AppError::not_found("assignment"))
}

/// Removes the assignment and its modification log. The materialized
/// planning stays with the client.
pub async fn delete_assignment(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let mut tx = super::begin_write(pool).await?;
    sqlx::query("DELETE FROM template_modifications WHERE assignment_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM template_assignments WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}

// ── Modification log ──

pub async fn insert_modification(pool: &SqlitePool, m: &Modification) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO template_modifications
            (id, assignment_id, week_number, day_name, exercise_node_id, set_id, field,
             old_value, new_value, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&m.id)
    .bind(&m.assignment_id)
    .bind(m.week_number)
    .bind(&m.day_name)
    .bind(&m.exercise_node_id)
    .bind(&m.set_id)
    .bind(m.field)
    .bind(m.old_value)
    .bind(m.new_value)
    .bind(&m.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_modifications(
    pool: &SqlitePool,
    assignment_id: &str,
) -> Result<Vec<Modification>, AppError> {
    let modifications = sqlx::query_as::<_, Modification>(
        r#"
        SELECT id, assignment_id, week_number, day_name, exercise_node_id, set_id, field,
               old_value, new_value, created_at
        FROM template_modifications
        WHERE assignment_id = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(assignment_id)
    .fetch_all(pool)
    .await?;

    Ok(modifications)
}
