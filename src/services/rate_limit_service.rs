use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

use crate::database::rating_repo;

pub const DAILY_RATING_LIMIT: i64 = 5;

/// Half-open UTC calendar day `[midnight, next midnight)` containing `now`.
pub fn utc_day_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now.date_naive().and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// True while the rater still has ratings left for the current UTC day.
pub async fn check_daily_limit(
    pool: &SqlitePool,
    rater_id: i64,
    now: DateTime<Utc>,
) -> sqlx::Result<bool> {
    let (since, until) = utc_day_window(now);
    let count = rating_repo::count_ratings(pool, rater_id, since, until).await?;
    Ok(count < DAILY_RATING_LIMIT)
}
