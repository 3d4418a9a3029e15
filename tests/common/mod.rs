//! Shared setup for the HTTP integration tests: a fresh SQLite file per
//! test, the real router behind `axum_test::TestServer`, and a registered
//! trainer.

#![allow(dead_code)]

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;
use trainer_desk::{app, db, AppState};

pub struct TestApp {
    pub server: TestServer,
    /// Access token of the trainer registered during setup.
    pub token: String,
    _dir: TempDir,
}

pub async fn spawn() -> TestApp {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("test.db").display());

    let pool = db::connect(&url, 5).await.unwrap();
    db::run_migrations(&pool).await.unwrap();

    let state = AppState {
        pool,
        jwt_secret: "test-secret".to_string(),
    };
    let server = TestServer::new(app(state, None)).unwrap();
    let token = register(&server, "coach", "coach@example.com", "trainer").await;

    TestApp {
        server,
        token,
        _dir: dir,
    }
}

/// Registers an account and returns its access token.
pub async fn register(server: &TestServer, username: &str, email: &str, role: &str) -> String {
    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": username,
            "email": email,
            "password": "correct horse battery",
            "role": role,
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    body["data"]["access_token"].as_str().unwrap().to_string()
}

pub async fn create_client(server: &TestServer, token: &str, name: &str, email: &str) -> String {
    let response = server
        .post("/api/v1/clients")
        .authorization_bearer(token)
        .json(&json!({ "name": name, "email": email }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    data(response.json())["id"].as_str().unwrap().to_string()
}

/// Links a client record to a client-role account on the trainer's behalf.
pub async fn link_client(server: &TestServer, token: &str, client_id: &str, username: &str) {
    let response = server
        .post(&format!("/api/v1/clients/{}/link", client_id))
        .authorization_bearer(token)
        .json(&json!({ "username": username }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

pub async fn create_exercise(server: &TestServer, token: &str, name: &str) -> String {
    let response = server
        .post("/api/v1/exercises")
        .authorization_bearer(token)
        .json(&json!({ "name": name, "muscle_group": "legs" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    data(response.json())["id"].as_str().unwrap().to_string()
}

/// Creates a planning and returns the full `data` payload.
pub async fn create_planning(
    server: &TestServer,
    token: &str,
    client_id: &str,
    weeks: u32,
) -> Value {
    let response = server
        .post("/api/v1/plannings")
        .authorization_bearer(token)
        .json(&json!({
            "name": "Block A",
            "start_date": "2026-01-05",
            "weeks": weeks,
            "client_id": client_id,
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    data(response.json())
}

pub fn data(body: Value) -> Value {
    assert_eq!(body["status"], "success", "unexpected body: {}", body);
    body["data"].clone()
}

pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}
