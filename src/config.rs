//! # Configuration
//!
//! Read once at startup from the environment (`.env` is loaded first by
//! `main`).
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `DATABASE_URL` | yes | |
//! | `JWT_SECRET` | yes | |
//! | `HOST` | no | `0.0.0.0` |
//! | `PORT` | no | `3000` |
//! | `DB_MAX_CONNECTIONS` | no | `5` |
//! | `CORS_ALLOW_ORIGIN` | no | any origin |

use std::env;

/// Server settings, read once in `main` and not touched afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// e.g. `sqlite:data/trainer.db`. The file is created when missing.
    pub database_url: String,
    /// Signs and verifies access and refresh tokens.
    pub jwt_secret: String,
    /// Bind address (default `0.0.0.0`).
    pub host: String,
    /// Bind port (default 3000). An unparsable value falls back to the default.
    pub port: u16,
    /// Upper bound of the SQLite pool (default 5).
    pub max_connections: u32,
    /// Single allowed origin; `None` allows any. `*` means any as well.
    pub cors_allow_origin: Option<String>,
}

impl Config {
    /// Reads the environment.
    ///
    /// # Errors
    /// `VarError` when `DATABASE_URL` or `JWT_SECRET` is missing; every other
    /// variable has a default.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            cors_allow_origin: env::var("CORS_ALLOW_ORIGIN")
                .ok()
                .filter(|v| !v.trim().is_empty() && v != "*"),
        })
    }

    /// `host:port`, ready for `TcpListener::bind`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
