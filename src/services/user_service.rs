use std::path::Path;

use serde::Serialize;

use crate::models::{Gender, UsersRow};
use crate::web::AVATAR_ROUTE;

/// Public profile of a user as returned by registration and `/users/me`.
#[derive(Debug, Serialize)]
pub struct UserProfileView {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub gender_label: String,
    pub avatar: Option<String>,
}

pub fn profile_view(row: &UsersRow) -> UserProfileView {
    UserProfileView {
        username: row.username.clone(),
        email: row.email.clone(),
        first_name: row.first_name.clone(),
        last_name: row.last_name.clone(),
        gender: row.gender,
        gender_label: row.gender.label().to_string(),
        avatar: row.avatar.as_deref().map(avatar_url),
    }
}

fn avatar_url(path: &str) -> String {
    let file_name = Path::new(path)
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{}/{}", AVATAR_ROUTE, file_name)
}
