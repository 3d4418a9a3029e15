use crate::error::AppError;
use crate::models::client::{Client, CreateClientRequest};
use sqlx::SqlitePool;

const COLUMNS: &str =
    "id, trainer_id, user_id, name, email, phone, birth_date, notes, created_at, updated_at";

pub async fn create_client(
    pool: &SqlitePool,
    id: &str,
    trainer_id: &str,
    req: &CreateClientRequest,
) -> Result<Client, AppError> {
    // an existing client-role account with the same email is linked right away
    sqlx::query(
        r#"
        INSERT INTO clients (id, trainer_id, user_id, name, email, phone, birth_date, notes)
        VALUES (?1, ?2,
                (SELECT id FROM users WHERE role = 'client' AND email = ?3 COLLATE NOCASE),
                ?4, ?3, ?5, ?6, ?7)
        "#,
    )
    .bind(id)
    .bind(trainer_id)
    .bind(&req.email)
    .bind(req.name.trim())
    .bind(&req.phone)
    .bind(req.birth_date)
    .bind(&req.notes)
    .execute(pool)
    .await?;

    get_client(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created client".to_string()))
}

pub async fn get_client(pool: &SqlitePool, id: &str) -> Result<Option<Client>, AppError> {
    let client = sqlx::query_as::<_, Client>(&format!("SELECT {} FROM clients WHERE id = ?", COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(client)
}

pub async fn list_clients(pool: &SqlitePool, trainer_id: &str) -> Result<Vec<Client>, AppError> {
    let clients = sqlx::query_as::<_, Client>(&format!(
        "SELECT {} FROM clients WHERE trainer_id = ? ORDER BY name COLLATE NOCASE",
        COLUMNS
    ))
    .bind(trainer_id)
    .fetch_all(pool)
    .await?;

    Ok(clients)
}

/// Client records linked to a client-role account.
pub async fn clients_of_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<Client>, AppError> {
    let clients = sqlx::query_as::<_, Client>(&format!(
        "SELECT {} FROM clients WHERE user_id = ?",
        COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(clients)
}

/// Points the record at a client-role account, or clears the link with
/// `None`.
pub async fn set_user(pool: &SqlitePool, id: &str, user_id: Option<&str>) -> Result<Client, AppError> {
    sqlx::query(
        r#"
        UPDATE clients
        SET user_id = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(user_id)
    .bind(id)
    .execute(pool)
    .await?;

    get_client(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("client"))
}

/// The client if it exists and belongs to the trainer. A client of another
/// trainer is reported as missing.
pub async fn owned_client(
    pool: &SqlitePool,
    trainer_id: &str,
    client_id: &str,
) -> Result<Client, AppError> {
    get_client(pool, client_id)
        .await?
        .filter(|c| c.trainer_id == trainer_id)
        .ok_or_else(|| AppError::not_found("client"))
}

/// Deletes the client with all of its plannings (children first) in one
/// transaction. Assignments go with the client.
pub async fn delete_client(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let mut tx = super::begin_write(pool).await?;

    let planning_ids: Vec<(String,)> = sqlx::query_as("SELECT id FROM plannings WHERE client_id = ?")
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
    for (planning_id,) in &planning_ids {
        super::plannings::purge_planning(&mut tx, planning_id).await?;
    }

    let result = sqlx::query("DELETE FROM clients WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}
