use serde::{Deserialize, Serialize};

/// Entry of the global exercise catalog referenced by plan exercises.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CatalogExercise {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub muscle_group: Option<String>,
    pub video_url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateExerciseRequest {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "descripcion")]
    pub description: Option<String>,
    #[serde(alias = "grupoMuscular", alias = "muscleGroup")]
    pub muscle_group: Option<String>,
    #[serde(alias = "videoUrl")]
    pub video_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExerciseQuery {
    /// Case-insensitive substring of the name.
    pub q: Option<String>,
    pub muscle_group: Option<String>,
}
