//! # Health check
//!
//! - `GET /api/v1/health` → `{"status": "success", "data": {"status": "ok", "database": "ok"}}`
//!
//! Pings the pool so a broken database shows up as a 500.

use crate::{
    error::AppError,
    response::{ok, ApiResponse},
    routes::AppState,
};
use axum::extract::State;
use serde_json::{json, Value};

pub async fn health_check(State(state): State<AppState>) -> Result<ApiResponse<Value>, AppError> {
    sqlx::query("SELECT 1").execute(&state.pool).await?;

    Ok(ok(json!({
        "status": "ok",
        "database": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
