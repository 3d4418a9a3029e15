use crate::tree::{PlanTree, SetField};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "principiante")]
    Beginner,
    #[serde(alias = "intermedio")]
    Intermediate,
    #[serde(alias = "avanzado")]
    Advanced,
}

/// Reusable plan. The whole week tree is embedded in the `tree` column.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlanningTemplate {
    pub id: String,
    pub trainer_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub tags: Json<Vec<String>>,
    pub total_weeks: i64,
    pub tree: Json<PlanTree>,
    pub created_at: String,
    pub updated_at: String,
}

/// List view without the tree.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub tags: Json<Vec<String>>,
    pub total_weeks: i64,
    pub assigned_clients: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "descripcion")]
    pub description: Option<String>,
    #[serde(alias = "categoria")]
    pub category: Option<String>,
    #[serde(alias = "dificultad")]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Number of empty weeks to scaffold when no tree is given.
    #[serde(alias = "totalWeeks", alias = "semanas")]
    pub total_weeks: Option<u32>,
    pub tree: Option<PlanTree>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CloneTemplateRequest {
    #[serde(alias = "newName", alias = "nombre")]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    /// Matches a normalized tag.
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AssignmentStatus {
    #[default]
    Active,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Assignment {
    pub id: String,
    pub template_id: String,
    pub client_id: String,
    /// Planning materialized for the client on assignment.
    pub planning_id: Option<String>,
    pub current_week: i64,
    pub current_day: i64,
    pub status: AssignmentStatus,
    pub assigned_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignClientRequest {
    #[serde(alias = "clientId", alias = "cliente")]
    pub client_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    #[serde(alias = "currentWeek")]
    pub current_week: Option<i64>,
    #[serde(alias = "currentDay")]
    pub current_day: Option<i64>,
    pub status: Option<AssignmentStatus>,
}

/// One audited change of a set field for an assigned client. The template
/// itself is not modified.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Modification {
    pub id: String,
    pub assignment_id: String,
    pub week_number: i64,
    pub day_name: String,
    pub exercise_node_id: String,
    pub set_id: String,
    pub field: SetField,
    pub old_value: Option<f64>,
    pub new_value: f64,
    pub created_at: String,
}

/// Path segment given either as a 0-based index or as a node id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SelectorInput {
    Index(usize),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub struct ModifyExerciseRequest {
    #[serde(alias = "semana")]
    pub week: u32,
    #[serde(alias = "dia")]
    pub day: String,
    #[serde(alias = "sesion")]
    pub session: SelectorInput,
    #[serde(alias = "ejercicio")]
    pub exercise: SelectorInput,
    #[serde(alias = "serie")]
    pub set: SelectorInput,
    #[serde(alias = "campo")]
    pub field: SetField,
    #[serde(alias = "newValue", alias = "valor")]
    pub value: f64,
}
