use crate::tree::{NewSession, PlanTree, SetInput, Week};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PlanningKind {
    /// Built by hand for one client.
    #[default]
    Plan,
    /// Materialized from a template assignment.
    TemplateInstance,
}

/// Planning header row. The week tree is stored in its own tables.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Planning {
    pub id: String,
    pub trainer_id: String,
    pub client_id: String,
    pub name: String,
    pub description: Option<String>,
    pub goal: Option<String>,
    pub start_date: NaiveDate,
    pub week_count: i64,
    pub kind: PlanningKind,
    pub template_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A planning with its populated weeks.
#[derive(Debug, Clone, Serialize)]
pub struct PlanningDetail {
    #[serde(flatten)]
    pub planning: Planning,
    pub weeks: Vec<Week>,
}

impl PlanningDetail {
    pub fn new(planning: Planning, tree: PlanTree) -> Self {
        Self {
            planning,
            weeks: tree.weeks,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePlanningRequest {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "descripcion")]
    pub description: Option<String>,
    #[serde(alias = "fechaInicio", alias = "startDate")]
    pub start_date: NaiveDate,
    #[serde(alias = "meta", alias = "objetivo")]
    pub goal: Option<String>,
    #[serde(alias = "semanas", alias = "week_count")]
    pub weeks: u32,
    #[serde(alias = "clientId", alias = "cliente")]
    pub client_id: String,
}

/// `POST /plannings/session`
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(alias = "planningId")]
    pub planning_id: String,
    #[serde(alias = "week_number", alias = "weekNumber", alias = "semana")]
    pub week: u32,
    #[serde(alias = "dia", alias = "day_name")]
    pub day: String,
    #[serde(flatten)]
    pub session: NewSession,
}

/// Full replacement of an exercise's sets.
#[derive(Debug, Deserialize)]
pub struct ReplaceSetsRequest {
    #[serde(alias = "series")]
    pub sets: Vec<SetInput>,
}
