use crate::tree::skeleton::SkeletonTree;
use crate::tree::Color;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// Esqueleto: an undated plan outline with color-coded day variants.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Skeleton {
    pub id: String,
    pub trainer_id: String,
    pub name: String,
    pub description: Option<String>,
    pub tree: Json<SkeletonTree>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SkeletonSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSkeletonRequest {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "descripcion")]
    pub description: Option<String>,
    #[serde(alias = "semanas")]
    pub weeks: u32,
}

#[derive(Debug, Deserialize)]
pub struct AddVariantRequest {
    pub color: Color,
}

