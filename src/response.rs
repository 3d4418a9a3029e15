//! Success envelope: `{"status": "success", "data": ...}`.
//!
//! Errors use the same outer shape with `"status": "error"`, see
//! [`crate::error::AppError`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    data: T,
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    status: &'static str,
    data: &'a T,
}

/// 200 with `data`.
pub fn ok<T: Serialize>(data: T) -> ApiResponse<T> {
    ApiResponse {
        status: StatusCode::OK,
        data,
    }
}

/// 201 with `data`.
pub fn created<T: Serialize>(data: T) -> ApiResponse<T> {
    ApiResponse {
        status: StatusCode::CREATED,
        data,
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = Json(Envelope {
            status: "success",
            data: &self.data,
        });
        (self.status, body).into_response()
    }
}
