//! # Data access layer
//!
//! Query functions grouped per table family. Handlers call these; nothing
//! else talks to SQLite.
//!
//! - `users`: accounts and refresh tokens
//! - `clients`: a trainer's clients
//! - `exercises`: the exercise catalog
//! - `plannings`: planning headers and the per-level tree tables
//! - `templates`: templates (embedded tree), assignments, modification log
//! - `skeletons`: skeletons (embedded tree)

pub mod clients;
pub mod exercises;
pub mod plannings;
pub mod skeletons;
pub mod templates;
pub mod users;

use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Transaction;
use std::str::FromStr;
use std::time::Duration;

/// Opens the pool. The database file is created when missing and foreign
/// keys are enforced on every connection.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Opens a write transaction. `BEGIN IMMEDIATE` takes the write lock up
/// front, so a concurrent writer waits out the busy timeout instead of
/// failing when a deferred read lock cannot be upgraded.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Timestamp format shared by every `*_at` column.
pub fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}
