use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

use crate::error::AppError;
use crate::models::{DirectoryUserRow, Gender};
use crate::services::directory_service::{self, DirectoryQuery};
use crate::services::user_service::{self, UserProfileView};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;

#[derive(Debug, Serialize)]
pub struct UserListItem {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl From<DirectoryUserRow> for UserListItem {
    fn from(row: DirectoryUserRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            gender: row.gender,
            created_at: row.created_at,
            distance_km: row.distance_km.map(|d| (d * 100.0).round() / 100.0),
        }
    }
}

pub async fn me_handler(
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Json<UserProfileView> {
    Json(user_service::profile_view(&user))
}

pub async fn list_users_handler(
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Vec<UserListItem>>, AppError> {
    query
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let users = directory_service::list_users(&state.pool, &user, &query).await?;
    Ok(Json(users.into_iter().map(UserListItem::from).collect()))
}
