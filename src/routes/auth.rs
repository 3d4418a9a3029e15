//! # Auth handlers
//!
//! ## Endpoints
//! - `POST /api/v1/auth/register` → create an account (trainer or client)
//! - `POST /api/v1/auth/login`    → username + password → tokens
//! - `POST /api/v1/auth/refresh`  → rotate a refresh token
//! - `POST /api/v1/auth/logout`   → revoke all refresh tokens of the user
//! - `GET  /api/v1/auth/me`       → current user
//!
//! Registration never links a client account to a client record. The
//! owning trainer does that (`POST /clients/{id}/link`), or the record is
//! created after the account with the same email.

use crate::{
    db::users as db_users,
    error::AppError,
    middleware::{
        auth::{create_access_token, create_refresh_token, hash_token, verify_access_token, AuthUser},
        json::ValidJson,
    },
    models::user::*,
    response::{created, ok, ApiResponse},
    routes::AppState,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode};
use chrono::{Duration, Utc};

/// Issues an access / refresh pair and stores the refresh token hash.
async fn issue_tokens(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let access_token = create_access_token(&user.id, user.role, &state.jwt_secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;
    let refresh_token = create_refresh_token(&user.id, user.role, &state.jwt_secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    let token_id = uuid::Uuid::now_v7().to_string();
    let token_hash = hash_token(&refresh_token);
    let expires_at = (Utc::now() + Duration::days(7))
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();

    db_users::store_refresh_token(&state.pool, &token_id, &user.id, &token_hash, &expires_at).await?;

    Ok(AuthResponse {
        user: user.into(),
        access_token,
        refresh_token,
    })
}

pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    if req.username.trim().len() < 3 {
        return Err(AppError::invalid("username", "must be at least 3 characters"));
    }
    if req.password.len() < 8 {
        return Err(AppError::invalid("password", "must be at least 8 characters"));
    }
    let email = req.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::invalid("email", "is not a valid email address"));
    }

    if db_users::find_by_username(&state.pool, req.username.trim()).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }
    if db_users::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    let user_id = uuid::Uuid::now_v7().to_string();
    let user = db_users::create_user(
        &state.pool,
        &user_id,
        req.username.trim(),
        &email,
        &password_hash,
        req.role,
    )
    .await?;

    tracing::info!(user_id = %user.id, role = ?user.role, "account registered");

    Ok(created(issue_tokens(&state, user).await?))
}

pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    let user = db_users::find_by_username(&state.pool, req.username.trim())
        .await?
        .ok_or(AppError::Unauthorized("Invalid username or password".to_string()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid username or password".to_string()))?;

    Ok(ok(issue_tokens(&state, user).await?))
}

/// The presented refresh token is deleted; a new pair is issued.
pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    verify_access_token(&req.refresh_token, &state.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    let token_hash = hash_token(&req.refresh_token);
    let (_token_id, user_id, expires_at) = db_users::find_refresh_token(&state.pool, &token_hash)
        .await?
        .ok_or(AppError::Unauthorized("Refresh token not found or revoked".to_string()))?;

    let expires = chrono::NaiveDateTime::parse_from_str(&expires_at, "%Y-%m-%dT%H:%M:%S%.3fZ")
        .map_err(|e| AppError::Internal(format!("Date parse error: {}", e)))?;
    db_users::delete_refresh_token(&state.pool, &token_hash).await?;
    if expires.and_utc() < Utc::now() {
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    let user = db_users::find_by_id(&state.pool, &user_id)
        .await?
        .ok_or(AppError::Unauthorized("User not found".to_string()))?;

    Ok(ok(issue_tokens(&state, user).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<StatusCode, AppError> {
    db_users::delete_user_refresh_tokens(&state.pool, &auth_user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let user = db_users::find_by_id(&state.pool, &auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    Ok(ok(user.into()))
}
