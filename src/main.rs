//! # trainer-desk server
//!
//! Entry point of the binary. Everything except process setup lives in the
//! library crate (`trainer_desk`), so the integration tests build the exact
//! same router.
//!
//! Startup steps:
//! 1. load `.env`
//! 2. initialize tracing
//! 3. read [`Config`] from the environment
//! 4. open the SQLite pool
//! 5. run migrations
//! 6. build the router and serve

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trainer_desk::{config::Config, db, routes, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment ──
    // A missing .env file is fine; real deployments set variables directly.
    dotenvy::dotenv().ok();

    // ── 2. Logging ──
    // RUST_LOG overrides the default filter, e.g.
    // `RUST_LOG=trainer_desk=info,tower_http=warn`.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trainer_desk=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3. Configuration ──
    let config = Config::from_env().context("DATABASE_URL and JWT_SECRET must be set")?;
    tracing::info!("Starting trainer-desk on {}", config.addr());

    // ── 4. Database pool ──
    // Foreign keys and the busy timeout are set per connection in db::connect.
    let pool = db::connect(&config.database_url, config.max_connections)
        .await
        .with_context(|| format!("cannot open database {}", config.database_url))?;

    // ── 5. Migrations ──
    // Embedded at compile time from ./migrations; only pending ones run.
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await?;

    // ── 6. Router and server ──
    // The pool is reference counted, so every handler shares the same one
    // through State<AppState>.
    let state = AppState {
        pool,
        jwt_secret: config.jwt_secret.clone(),
    };
    let app = routes::app(state, config.cors_allow_origin.as_deref());

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("cannot bind {}", config.addr()))?;
    tracing::info!("Server listening on {}", config.addr());

    axum::serve(listener, app).await?;

    Ok(())
}
