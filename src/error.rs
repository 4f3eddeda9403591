use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::services::auth_service::AuthError;
use crate::services::rating_service::RatingError;
use crate::services::registration_service::RegistrationError;
use crate::services::watermark_service::WatermarkError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Rating(#[from] RatingError),
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error("store unavailable: {0}")]
    Store(#[from] sqlx::Error),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Auth(e) => match e {
                AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
                AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "unauthorized"),
                AuthError::Inactive => (StatusCode::FORBIDDEN, "user_inactive"),
                AuthError::Password(_) | AuthError::Jwt(_) | AuthError::Store(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
            },
            AppError::Rating(e) => match e {
                RatingError::QuotaExceeded => (StatusCode::TOO_MANY_REQUESTS, "quota_exceeded"),
                RatingError::TargetNotFound => (StatusCode::NOT_FOUND, "not_found"),
                RatingError::SelfRatingForbidden => (StatusCode::BAD_REQUEST, "self_rating"),
                RatingError::DuplicateRating => (StatusCode::BAD_REQUEST, "duplicate_rating"),
                RatingError::StoreUnavailable(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "store_unavailable")
                }
            },
            AppError::Registration(e) => match e {
                RegistrationError::Invalid(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                RegistrationError::AlreadyRegistered => (StatusCode::CONFLICT, "already_registered"),
                RegistrationError::Media(WatermarkError::InvalidImage(_)) => {
                    (StatusCode::BAD_REQUEST, "invalid_image")
                }
                RegistrationError::Media(_)
                | RegistrationError::Password(_)
                | RegistrationError::Store(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
            },
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_unavailable"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let detail = if status.is_server_error() {
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(serde_json::json!({ "error": code, "detail": detail })),
        )
            .into_response()
    }
}
