use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::database::{self, rating_repo, user_repo};
use crate::models::UsersRow;
use crate::services::notification_service::{self, Notifier};
use crate::services::rate_limit_service;

pub const MESSAGE_RATING_SAVED: &str = "rating saved";
pub const MESSAGE_MUTUAL_SYMPATHY: &str = "mutual sympathy";

#[derive(Debug, Error)]
pub enum RatingError {
    #[error("daily rating limit reached")]
    QuotaExceeded,
    #[error("user not found")]
    TargetNotFound,
    #[error("you cannot rate yourself")]
    SelfRatingForbidden,
    #[error("you have already rated this user")]
    DuplicateRating,
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RateOutcome {
    pub message: String,
    pub email: Option<String>,
}

impl RateOutcome {
    pub fn is_mutual(&self) -> bool {
        self.email.is_some()
    }
}

/// Records `rater -> rated_id` and reports whether it completed a mutual match.
///
/// Rejections are checked in a fixed order: quota, missing target, self-rating,
/// duplicate. The emails for a mutual match are sent in the background.
pub async fn rate_user(
    pool: &SqlitePool,
    notifier: &Arc<dyn Notifier>,
    rater: &UsersRow,
    rated_id: i64,
    now: DateTime<Utc>,
) -> Result<RateOutcome, RatingError> {
    if !rate_limit_service::check_daily_limit(pool, rater.id, now).await? {
        return Err(RatingError::QuotaExceeded);
    }

    let Some(rated) = user_repo::find_user_by_id(pool, rated_id).await? else {
        return Err(RatingError::TargetNotFound);
    };

    if rater.id == rated.id {
        return Err(RatingError::SelfRatingForbidden);
    }

    if rating_repo::find_rating(pool, rater.id, rated.id)
        .await?
        .is_some()
    {
        return Err(RatingError::DuplicateRating);
    }

    let rating_id = rating_repo::insert_rating(pool, rater.id, rated.id, now)
        .await
        .map_err(map_insert_error)?;

    // Ids follow commit order, so of two crossing ratings only the one
    // written second completes the match.
    let mutual = rating_repo::find_rating(pool, rated.id, rater.id)
        .await?
        .is_some_and(|reverse| reverse.id < rating_id);

    if !mutual {
        info!(rater_id = rater.id, rated_id = rated.id, "rating saved");
        return Ok(RateOutcome {
            message: MESSAGE_RATING_SAVED.to_string(),
            email: None,
        });
    }

    info!(rater_id = rater.id, rated_id = rated.id, "mutual match");
    notification_service::dispatch_mutual_match(
        notifier.clone(),
        notification_service::mutual_match_pair(
            &rater.username,
            &rater.email,
            &rated.username,
            &rated.email,
        ),
    );

    Ok(RateOutcome {
        message: MESSAGE_MUTUAL_SYMPATHY.to_string(),
        email: Some(rated.email),
    })
}

// A concurrent request may insert the same pair between our check and insert.
fn map_insert_error(err: sqlx::Error) -> RatingError {
    if database::is_unique_violation(&err) {
        RatingError::DuplicateRating
    } else {
        RatingError::StoreUnavailable(err)
    }
}
