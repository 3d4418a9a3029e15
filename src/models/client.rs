use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A trainer's client. `user_id` is the client-role account allowed to read
/// the client's plannings. Only the trainer sets it: explicitly through the
/// link endpoint, or at creation when an account with the same email exists.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    pub id: String,
    pub trainer_id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    #[serde(alias = "nombre")]
    pub name: String,
    pub email: Option<String>,
    #[serde(alias = "telefono")]
    pub phone: Option<String>,
    #[serde(alias = "fechaNacimiento")]
    pub birth_date: Option<NaiveDate>,
    #[serde(alias = "notas")]
    pub notes: Option<String>,
}

/// Body of `POST /clients/{id}/link`.
#[derive(Debug, Deserialize)]
pub struct LinkClientRequest {
    #[serde(alias = "usuario")]
    pub username: String,
}
