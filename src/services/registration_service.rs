use bytes::Bytes;
use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use validator::Validate;

use crate::config::MediaConfig;
use crate::database::{self, user_repo};
use crate::models::{Gender, UsersRow};
use crate::security::password::{self, PasswordError};
use crate::services::watermark_service::{self, WatermarkError};

#[derive(Debug, Default, Validate)]
pub struct RegistrationForm {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub gender: Option<Gender>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Invalid(String),
    #[error("username or email already registered")]
    AlreadyRegistered,
    #[error(transparent)]
    Media(#[from] WatermarkError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("store unavailable: {0}")]
    Store(#[from] sqlx::Error),
}

pub async fn register_user(
    pool: &SqlitePool,
    media: &MediaConfig,
    form: RegistrationForm,
    avatar: Option<Bytes>,
) -> Result<UsersRow, RegistrationError> {
    form.validate()
        .map_err(|e| RegistrationError::Invalid(e.to_string()))?;
    let gender = form
        .gender
        .ok_or_else(|| RegistrationError::Invalid("gender is required".to_string()))?;
    if form.latitude.is_some() != form.longitude.is_some() {
        return Err(RegistrationError::Invalid(
            "latitude and longitude must be given together".to_string(),
        ));
    }
    let avatar = avatar
        .filter(|b| !b.is_empty())
        .ok_or_else(|| RegistrationError::Invalid("avatar is required".to_string()))?;

    if user_repo::username_or_email_taken(pool, &form.username, &form.email).await? {
        return Err(RegistrationError::AlreadyRegistered);
    }

    let password_hash = password::hash_password(&form.password)?;
    let avatar_path = watermark_service::watermark_and_store(media, avatar).await?;
    let avatar_str = avatar_path.to_string_lossy().to_string();

    let inserted = user_repo::insert_user(
        pool,
        user_repo::NewUser {
            username: &form.username,
            email: &form.email,
            password_hash: &password_hash,
            gender,
            first_name: &form.first_name,
            last_name: &form.last_name,
            avatar: Some(&avatar_str),
            latitude: form.latitude,
            longitude: form.longitude,
            is_active: true,
            created_at: Utc::now(),
        },
    )
    .await;

    let user_id = match inserted {
        Ok(id) => id,
        Err(e) => {
            if let Err(rm) = tokio::fs::remove_file(&avatar_path).await {
                warn!(path = %avatar_str, error = %rm, "failed to remove orphaned avatar");
            }
            if database::is_unique_violation(&e) {
                return Err(RegistrationError::AlreadyRegistered);
            }
            return Err(e.into());
        }
    };

    info!(user_id, username = %form.username, "user registered");
    user_repo::find_user_by_id(pool, user_id)
        .await?
        .ok_or(RegistrationError::Store(sqlx::Error::RowNotFound))
}
