use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::{Gender, UsersRow};

pub const SQL_FIND_USER_BY_ID: &str = r#"
SELECT
    id, username, email, password, gender, first_name, last_name,
    avatar, latitude, longitude, is_active, created_at
FROM users
WHERE id = ?1
LIMIT 1
"#;

pub const SQL_FIND_USER_BY_USERNAME: &str = r#"
SELECT
    id, username, email, password, gender, first_name, last_name,
    avatar, latitude, longitude, is_active, created_at
FROM users
WHERE username = ?1
LIMIT 1
"#;

pub const SQL_EXISTS_USERNAME_OR_EMAIL: &str = r#"
SELECT COUNT(*)
FROM users
WHERE username = ?1 OR email = ?2
"#;

const SQL_INSERT_USER: &str = r#"
INSERT INTO users (
  username,
  email,
  password,
  gender,
  first_name,
  last_name,
  avatar,
  latitude,
  longitude,
  is_active,
  created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
"#;

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub gender: Gender,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub avatar: Option<&'a str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub async fn find_user_by_id(pool: &SqlitePool, user_id: i64) -> sqlx::Result<Option<UsersRow>> {
    sqlx::query_as::<_, UsersRow>(SQL_FIND_USER_BY_ID)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> sqlx::Result<Option<UsersRow>> {
    sqlx::query_as::<_, UsersRow>(SQL_FIND_USER_BY_USERNAME)
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn username_or_email_taken(
    pool: &SqlitePool,
    username: &str,
    email: &str,
) -> sqlx::Result<bool> {
    let count: i64 = sqlx::query_scalar(SQL_EXISTS_USERNAME_OR_EMAIL)
        .bind(username)
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn insert_user(pool: &SqlitePool, user: NewUser<'_>) -> sqlx::Result<i64> {
    let res = sqlx::query(SQL_INSERT_USER)
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.gender)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.avatar)
        .bind(user.latitude)
        .bind(user.longitude)
        .bind(user.is_active)
        .bind(user.created_at)
        .execute(pool)
        .await?;
    Ok(res.last_insert_rowid())
}
