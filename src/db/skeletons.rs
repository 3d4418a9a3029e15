use crate::error::AppError;
use crate::models::skeleton::{Skeleton, SkeletonSummary};
use crate::tree::skeleton::SkeletonTree;
use sqlx::types::Json;
use sqlx::{Executor, Sqlite, SqlitePool};

pub async fn create_skeleton(
    pool: &SqlitePool,
    id: &str,
    trainer_id: &str,
    name: &str,
    description: Option<&str>,
    tree: &SkeletonTree,
) -> Result<Skeleton, AppError> {
    sqlx::query(
        r#"
        INSERT INTO skeletons (id, trainer_id, name, description, tree)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(trainer_id)
    .bind(name)
    .bind(description)
    .bind(Json(tree))
    .execute(pool)
    .await?;

    get_skeleton(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created skeleton".to_string()))
}

pub async fn get_skeleton<'e, E>(executor: E, id: &str) -> Result<Option<Skeleton>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let skeleton = sqlx::query_as::<_, Skeleton>(
        r#"
        SELECT id, trainer_id, name, description, tree, created_at, updated_at
        FROM skeletons
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(skeleton)
}

/// Missing → 404, another trainer's → 403.
pub async fn owned_skeleton<'e, E>(executor: E, trainer_id: &str, id: &str) -> Result<Skeleton, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let skeleton = get_skeleton(executor, id)
        .await?
        .ok_or_else(|| AppError::not_found("skeleton"))?;
    if skeleton.trainer_id != trainer_id {
        return Err(AppError::Forbidden(
            "You do not have access to this skeleton".to_string(),
        ));
    }
    Ok(skeleton)
}

pub async fn list_skeletons(pool: &SqlitePool, trainer_id: &str) -> Result<Vec<SkeletonSummary>, AppError> {
    let skeletons = sqlx::query_as::<_, SkeletonSummary>(
        r#"
        SELECT id, name, description, created_at, updated_at
        FROM skeletons
        WHERE trainer_id = ?
        ORDER BY updated_at DESC
        "#,
    )
    .bind(trainer_id)
    .fetch_all(pool)
    .await?;

    Ok(skeletons)
}

/// Read → edit → write of the embedded tree in one transaction.
pub async fn edit_skeleton<T>(
    pool: &SqlitePool,
    trainer_id: &str,
    id: &str,
    edit: impl FnOnce(&mut SkeletonTree) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut tx = super::begin_write(pool).await?;
    let mut skeleton = owned_skeleton(&mut *tx, trainer_id, id).await?;

    let out = edit(&mut skeleton.tree.0)?;

    sqlx::query(
        r#"
        UPDATE skeletons
        SET tree = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(Json(&skeleton.tree.0))
    .bind(id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(out)
}

pub async fn delete_skeleton(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM skeletons WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
