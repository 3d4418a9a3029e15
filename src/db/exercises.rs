use crate::error::AppError;
use crate::models::exercise::{CatalogExercise, CreateExerciseRequest, ExerciseQuery};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::BTreeSet;

pub async fn create_exercise(
    pool: &SqlitePool,
    id: &str,
    created_by: &str,
    req: &CreateExerciseRequest,
) -> Result<CatalogExercise, AppError> {
    sqlx::query(
        r#"
        INSERT INTO exercises (id, name, description, muscle_group, video_url, created_by)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(req.name.trim())
    .bind(&req.description)
    .bind(&req.muscle_group)
    .bind(&req.video_url)
    .bind(created_by)
    .execute(pool)
    .await?;

    get_exercise(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created exercise".to_string()))
}

pub async fn get_exercise(pool: &SqlitePool, id: &str) -> Result<Option<CatalogExercise>, AppError> {
    let exercise = sqlx::query_as::<_, CatalogExercise>(
        r#"
        SELECT id, name, description, muscle_group, video_url, created_by, created_at
        FROM exercises
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(exercise)
}

pub async fn list_exercises(
    pool: &SqlitePool,
    query: &ExerciseQuery,
) -> Result<Vec<CatalogExercise>, AppError> {
    let mut builder = QueryBuilder::<Sqlite>::new(
        "SELECT id, name, description, muscle_group, video_url, created_by, created_at FROM exercises WHERE 1 = 1",
    );
    if let Some(q) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
        builder
            .push(" AND name LIKE ")
            .push_bind(format!("%{}%", q.trim()))
            .push(" COLLATE NOCASE");
    }
    if let Some(group) = &query.muscle_group {
        builder
            .push(" AND muscle_group = ")
            .push_bind(group.clone())
            .push(" COLLATE NOCASE");
    }
    builder.push(" ORDER BY name COLLATE NOCASE");

    let exercises = builder
        .build_query_as::<CatalogExercise>()
        .fetch_all(pool)
        .await?;

    Ok(exercises)
}

/// Catalog ids from `ids` that do not exist.
pub async fn missing_ids<'a>(
    pool: &SqlitePool,
    ids: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<String>, AppError> {
    let wanted: BTreeSet<&str> = ids.into_iter().collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = QueryBuilder::<Sqlite>::new("SELECT id FROM exercises WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in &wanted {
        separated.push_bind(id.to_string());
    }
    separated.push_unseparated(")");

    let found: Vec<(String,)> = builder.build_query_as().fetch_all(pool).await?;
    let found: BTreeSet<String> = found.into_iter().map(|(id,)| id).collect();

    Ok(wanted
        .into_iter()
        .filter(|id| !found.contains(*id))
        .map(str::to_string)
        .collect())
}
