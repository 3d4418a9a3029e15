//! # Routes
//!
//! HTTP handlers grouped per resource, all mounted under `/api/v1`:
//! - `auth`: register, login, token refresh, logout, current user
//! - `clients`: a trainer's clients
//! - `exercises`: the exercise catalog
//! - `plannings`: plannings and every edit of their week tree
//! - `templates`: templates, cloning, client assignment, modification log
//! - `skeletons`: esqueletos and their variant tree
//! - `health`: liveness

pub mod auth;
pub mod clients;
pub mod exercises;
pub mod health;
pub mod plannings;
pub mod skeletons;
pub mod templates;

use crate::error::AppError;
use crate::tree::{DayName, Level, Selector};
use axum::{
    http::HeaderValue,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::SqlitePool;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared by every handler through `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt_secret: String,
}

/// Path ids must be UUIDs; anything else is a 400, not a 404.
pub fn parse_id(raw: &str, what: &str) -> Result<String, AppError> {
    uuid::Uuid::parse_str(raw.trim())
        .map(|id| id.to_string())
        .map_err(|_| AppError::invalid(format!("{}_id", what), "must be a valid UUID"))
}

/// Path segment for a session / exercise / set: 0-based index or node id.
pub fn parse_selector(raw: &str, level: Level) -> Result<Selector, AppError> {
    Selector::parse(raw).ok_or_else(|| {
        AppError::invalid(
            level.to_string(),
            format!("'{}' is neither an index nor a valid id", raw),
        )
    })
}

/// Week numbers start at 1.
pub fn parse_week(raw: &str) -> Result<u32, AppError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|w| *w >= 1)
        .ok_or_else(|| AppError::invalid("week", "must be a positive week number"))
}

pub fn parse_day(raw: &str) -> Result<DayName, AppError> {
    raw.parse::<DayName>().map_err(AppError::from)
}

pub fn app(state: AppState, allow_origin: Option<&str>) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let planning_routes = Router::new()
        .route("/plannings", get(plannings::list_plannings).post(plannings::create_planning))
        .route("/plannings/session", post(plannings::create_session))
        .route(
            "/plannings/session/{session_id}",
            patch(plannings::update_session).delete(plannings::delete_session),
        )
        .route("/plannings/session/{session_id}/exercise", post(plannings::add_exercise))
        .route(
            "/plannings/sets/{set_id}/checkins",
            get(plannings::list_check_ins).post(plannings::add_check_in),
        )
        .route(
            "/plannings/{id}",
            get(plannings::get_planning).delete(plannings::delete_planning),
        )
        .route("/plannings/{id}/anadirsemanasiguiente", post(plannings::add_next_week))
        .route("/plannings/{id}/weeks/{week}/days/{day}", get(plannings::get_day))
        .route(
            "/plannings/{id}/weeks/{week}/days/{day}/sessions/{session}/exercises/{exercise}",
            put(plannings::replace_sets).delete(plannings::delete_exercise),
        )
        .route(
            "/plannings/{id}/weeks/{week}/days/{day}/sessions/{session}/exercises/{exercise}/sets/{set}/render-config",
            patch(plannings::update_render_config),
        );

    let template_routes = Router::new()
        .route("/templates", get(templates::list_templates).post(templates::create_template))
        .route(
            "/templates/{id}",
            get(templates::get_template)
                .patch(templates::update_template)
                .delete(templates::delete_template),
        )
        .route("/templates/{id}/tree", put(templates::replace_tree))
        .route("/templates/{id}/weeks", post(templates::add_week))
        .route(
            "/templates/{id}/weeks/{week}/days/{day}/sessions",
            post(templates::add_session),
        )
        .route(
            "/templates/{id}/weeks/{week}/days/{day}/sessions/{session}",
            delete(templates::delete_session),
        )
        .route(
            "/templates/{id}/weeks/{week}/days/{day}/sessions/{session}/exercises",
            post(templates::add_exercise),
        )
        .route("/templates/{id}/clone", post(templates::clone_template))
        .route("/templates/{id}/assign", post(templates::assign_client))
        .route("/templates/{id}/clients", get(templates::list_assignments))
        .route(
            "/templates/{id}/clients/{client_id}",
            delete(templates::unassign_client),
        )
        .route(
            "/templates/{id}/clients/{client_id}/progress",
            patch(templates::update_progress),
        )
        .route(
            "/templates/{id}/clients/{client_id}/exercises",
            patch(templates::modify_client_exercise),
        )
        .route(
            "/templates/{id}/clients/{client_id}/modifications",
            get(templates::list_modifications),
        );

    let skeleton_routes = Router::new()
        .route("/esqueletos", get(skeletons::list_skeletons).post(skeletons::create_skeleton))
        .route(
            "/esqueletos/{id}",
            get(skeletons::get_skeleton).delete(skeletons::delete_skeleton),
        )
        .route("/esqueletos/{id}/weeks", post(skeletons::add_week))
        .route(
            "/esqueletos/{id}/weeks/{week}/days/{day}/variants",
            post(skeletons::add_variant),
        )
        .route(
            "/esqueletos/{id}/weeks/{week}/days/{day}/variants/{color}/sessions",
            post(skeletons::add_session),
        )
        .route(
            "/esqueletos/{id}/weeks/{week}/days/{day}/variants/{color}/sessions/{session}/exercises",
            post(skeletons::add_exercise),
        );

    let api_routes = Router::new()
        .merge(auth_routes)
        .route("/clients", get(clients::list_clients).post(clients::create_client))
        .route(
            "/clients/{id}",
            get(clients::get_client).delete(clients::delete_client),
        )
        .route("/clients/{id}/plannings", get(clients::list_client_plannings))
        .route(
            "/clients/{id}/link",
            post(clients::link_account).delete(clients::unlink_account),
        )
        .route("/exercises", get(exercises::list_exercises).post(exercises::create_exercise))
        .route("/exercises/{id}", get(exercises::get_exercise))
        .merge(planning_routes)
        .merge(template_routes)
        .merge(skeleton_routes)
        .route("/health", get(health::health_check))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors_layer(allow_origin))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    let origin = match allow_origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(_)) => {
            tracing::warn!("CORS_ALLOW_ORIGIN is not a valid header value, allowing any origin");
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_uuids() {
        assert!(parse_id("not-a-uuid", "planning").is_err());
        let id = uuid::Uuid::now_v7().to_string();
        assert_eq!(parse_id(&id, "planning").unwrap(), id);
    }

    #[test]
    fn selectors_and_days() {
        assert_eq!(parse_selector("1", Level::Session).unwrap(), Selector::Index(1));
        assert!(matches!(
            parse_selector("first", Level::Session),
            Err(AppError::InvalidField { ref field, .. }) if field == "session"
        ));
        assert_eq!(parse_day("miercoles").unwrap(), DayName::Wednesday);
        assert!(parse_day("funday").is_err());
        assert_eq!(parse_week("3").unwrap(), 3);
        assert!(parse_week("0").is_err());
    }
}
