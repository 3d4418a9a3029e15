//! # Client handlers
//!
//! ## Endpoints
//! - `GET    /api/v1/clients`                → the trainer's clients
//! - `POST   /api/v1/clients`                → create a client
//! - `GET    /api/v1/clients/{id}`           → one client
//! - `DELETE /api/v1/clients/{id}`           → delete with all plannings
//! - `GET    /api/v1/clients/{id}/plannings` → the client's plannings
//! - `POST   /api/v1/clients/{id}/link`      → link a client-role account
//! - `DELETE /api/v1/clients/{id}/link`      → drop the link
//!
//! Client accounts may read their own record and plannings. Which account
//! that is stays under the trainer's control.

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
use axum::{
    extract::{Path, State},
    http::StatusCode,
};

/// The client if the user is its trainer or its linked account.
async fn readable_client(state: &AppState, user: &AuthUser, id: &str) -> Result<Client, AppError> {
    let client = db::clients::get_client(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("client"))?;

    let allowed = if user.is_trainer() {
        client.trainer_id == user.user_id
    } else {
        client.user_id.as_deref() == Some(user.user_id.as_str())
    };
    if !allowed {
        return Err(AppError::Forbidden(
            "You do not have access to this client".to_string(),
        ));
    }
    Ok(client)
}

/// Trainers see their clients; client accounts see their own records.
pub async fn list_clients(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<ApiResponse<Vec<Client>>, AppError> {
    let clients = if user.is_trainer() {
        db::clients::list_clients(&state.pool, &user.user_id).await?
    } else {
        db::clients::clients_of_user(&state.pool, &user.user_id).await?
    };
    Ok(ok(clients))
}

pub async fn create_client(
    State(state): State<AppState>,
    trainer: TrainerUser,
    ValidJson(mut req): ValidJson<CreateClientRequest>,
) -> Result<ApiResponse<Client>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::invalid("name", "must not be empty"));
    }
    req.email = req
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());
    if matches!(&req.email, Some(e) if !e.contains('@')) {
        return Err(AppError::invalid("email", "is not a valid email address"));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let client = db::clients::create_client(&state.pool, &id, &trainer.user_id, &req).await?;
    tracing::info!(client_id = %client.id, trainer_id = %trainer.user_id, "client created");

    Ok(created(client))
}

pub async fn get_client(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<Client>, AppError> {
    let id = parse_id(&id, "client")?;
    Ok(ok(readable_client(&state, &user, &id).await?))
}

/// Links the record to an existing client-role account by username.
pub async fn link_account(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<LinkClientRequest>,
) -> Result<ApiResponse<Client>, AppError> {
    let id = parse_id(&id, "client")?;
    db::clients::owned_client(&state.pool, &trainer.user_id, &id).await?;

    let account = db::users::find_by_username(&state.pool, req.username.trim())
        .await?
        .ok_or_else(|| AppError::not_found(format!("account {}", req.username.trim())))?;
    if account.role != Role::Client {
        return Err(AppError::invalid("username", "is not a client account"));
    }

    let client = db::clients::set_user(&state.pool, &id, Some(&account.id)).await?;
    tracing::info!(client_id = %id, user_id = %account.id, "client account linked");

    Ok(ok(client))
}

pub async fn unlink_account(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "client")?;
    db::clients::owned_client(&state.pool, &trainer.user_id, &id).await?;
    db::clients::set_user(&state.pool, &id, None).await?;
    tracing::info!(client_id = %id, "client account unlinked");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_client(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "client")?;
    let client = db::clients::get_client(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("client"))?;
    if client.trainer_id != trainer.user_id {
        return Err(AppError::Forbidden(
            "You do not have access to this client".to_string(),
        ));
    }

    if !db::clients::delete_client(&state.pool, &id).await? {
        return Err(AppError::not_found("client"));
    }
    tracing::info!(client_id = %id, "client deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_client_plannings(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<Planning>>, AppError> {
    let id = parse_id(&id, "client")?;
    let client = readable_client(&state, &user, &id).await?;
    Ok(ok(db::plannings::list_for_client(&state.pool, &client.id).await?))
}
