use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::Gender;

// Candidate row for the user directory (distance is computed after loading).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DirectoryUserRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationOrder {
    #[serde(alias = "Последние зарегистрированные")]
    Latest,
    #[serde(alias = "Ранее зарегистрированные")]
    Earliest,
}
