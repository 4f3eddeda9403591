use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::RatingsRow;

pub const SQL_FIND_RATING: &str = r#"
SELECT id, rater_id, rated_id, created_at
FROM ratings
WHERE rater_id = ?1
  AND rated_id = ?2
LIMIT 1
"#;

pub const SQL_COUNT_RATINGS_IN_WINDOW: &str = r#"
SELECT COUNT(*)
FROM ratings
WHERE rater_id = ?1
  AND created_at >= ?2
  AND created_at < ?3
"#;

const SQL_INSERT_RATING: &str = r#"
INSERT INTO ratings (
  rater_id,
  rated_id,
  created_at
) VALUES (?1, ?2, ?3)
"#;

pub async fn find_rating(
    pool: &SqlitePool,
    rater_id: i64,
    rated_id: i64,
) -> sqlx::Result<Option<RatingsRow>> {
    sqlx::query_as::<_, RatingsRow>(SQL_FIND_RATING)
        .bind(rater_id)
        .bind(rated_id)
        .fetch_optional(pool)
        .await
}

/// Counts ratings made by `rater_id` with `since <= created_at < until`.
pub async fn count_ratings(
    pool: &SqlitePool,
    rater_id: i64,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
) -> sqlx::Result<i64> {
    sqlx::query_scalar(SQL_COUNT_RATINGS_IN_WINDOW)
        .bind(rater_id)
        .bind(since)
        .bind(until)
        .fetch_one(pool)
        .await
}

/// Returns the new row id; ids grow in commit order.
pub async fn insert_rating(
    pool: &SqlitePool,
    rater_id: i64,
    rated_id: i64,
    created_at: DateTime<Utc>,
) -> sqlx::Result<i64> {
    let res = sqlx::query(SQL_INSERT_RATING)
        .bind(rater_id)
        .bind(rated_id)
        .bind(created_at)
        .execute(pool)
        .await?;
    Ok(res.last_insert_rowid())
}
