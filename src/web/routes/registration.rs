use axum::{
    extract::{multipart::Field, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;

use crate::error::AppError;
use crate::services::registration_service::{self, RegistrationForm};
use crate::services::user_service::{self, UserProfileView};
use crate::state::AppState;

pub async fn registration_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UserProfileView>), AppError> {
    let mut form = RegistrationForm::default();
    let mut avatar: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "avatar" => {
                avatar = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                )
            }
            "username" => form.username = text(field).await?,
            "email" => form.email = text(field).await?,
            "password" => form.password = text(field).await?,
            "first_name" => form.first_name = text(field).await?,
            "last_name" => form.last_name = text(field).await?,
            "gender" => {
                form.gender = Some(text(field).await?.parse().map_err(AppError::BadRequest)?)
            }
            "latitude" => form.latitude = number(field).await?,
            "longitude" => form.longitude = number(field).await?,
            _ => {}
        }
    }

    let user =
        registration_service::register_user(&state.pool, &state.media, form, avatar).await?;
    Ok((StatusCode::CREATED, Json(user_service::profile_view(&user))))
}

async fn text(field: Field<'_>) -> Result<String, AppError> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map(|s| s.trim().to_string())
        .map_err(|e| AppError::BadRequest(format!("{name}: {e}")))
}

async fn number(field: Field<'_>) -> Result<Option<f64>, AppError> {
    let name = field.name().unwrap_or_default().to_string();
    let raw = text(field).await?;
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("{name} must be a number")))
}
