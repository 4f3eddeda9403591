use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::database::{schema, user_repo};
use crate::models::{Gender, UsersRow};

pub async fn test_pool() -> SqlitePool {
    // One long-lived connection keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    schema::apply_schema(&pool).await.unwrap();
    pool
}

pub struct Profile<'a> {
    pub username: &'a str,
    pub gender: Gender,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub coords: Option<(f64, f64)>,
    pub created_at: DateTime<Utc>,
}

impl<'a> Profile<'a> {
    pub fn new(username: &'a str) -> Self {
        Self {
            username,
            gender: Gender::Female,
            first_name: username,
            last_name: "Test",
            coords: None,
            created_at: Utc::now(),
        }
    }
}

pub async fn seed_user(pool: &SqlitePool, username: &str, coords: Option<(f64, f64)>) -> UsersRow {
    seed_profile(
        pool,
        Profile {
            coords,
            ..Profile::new(username)
        },
    )
    .await
}

pub async fn seed_profile(pool: &SqlitePool, profile: Profile<'_>) -> UsersRow {
    let email = format!("{}@example.com", profile.username);
    let id = user_repo::insert_user(
        pool,
        user_repo::NewUser {
            username: profile.username,
            email: &email,
            password_hash: "$argon2id$test",
            gender: profile.gender,
            first_name: profile.first_name,
            last_name: profile.last_name,
            avatar: None,
            latitude: profile.coords.map(|c| c.0),
            longitude: profile.coords.map(|c| c.1),
            is_active: true,
            created_at: profile.created_at,
        },
    )
    .await
    .unwrap();

    user_repo::find_user_by_id(pool, id).await.unwrap().unwrap()
}

/// File-backed pool for tests that need several connections racing.
pub async fn file_pool(path: &Path, connections: u32) -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(10));
    let pool = SqlitePoolOptions::new()
        .max_connections(connections)
        .connect_with(options)
        .await
        .unwrap();
    schema::apply_schema(&pool).await.unwrap();
    pool
}
