use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;

use crate::error::AppError;
use crate::services::rating_service::{self, RateOutcome};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;

pub async fn rate_user_handler(
    Extension(AuthenticatedUser(rater)): Extension<AuthenticatedUser>,
    Path(rated_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<RateOutcome>), AppError> {
    let outcome =
        rating_service::rate_user(&state.pool, &state.notifier, &rater, rated_id, Utc::now())
            .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
