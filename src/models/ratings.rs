use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RatingsRow {
    pub id: i64,
    pub rater_id: i64,
    pub rated_id: i64,
    pub created_at: DateTime<Utc>,
}
