use sqlx::SqlitePool;

const SQL_CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    gender TEXT NOT NULL CHECK (gender IN ('male', 'female')),
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    avatar TEXT,
    latitude REAL,
    longitude REAL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
)
"#;

// UNIQUE (rater_id, rated_id) closes the check-then-insert race in rating.
const SQL_CREATE_RATINGS: &str = r#"
CREATE TABLE IF NOT EXISTS ratings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rater_id INTEGER NOT NULL REFERENCES users (id),
    rated_id INTEGER NOT NULL REFERENCES users (id),
    created_at TEXT NOT NULL,
    UNIQUE (rater_id, rated_id)
)
"#;

const SQL_CREATE_RATINGS_RATER_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_ratings_rater_created
ON ratings (rater_id, created_at)
"#;

const SQL_DROP_TABLES: [&str; 2] = ["DROP TABLE IF EXISTS ratings", "DROP TABLE IF EXISTS users"];

pub async fn apply_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    for sql in [
        SQL_CREATE_USERS,
        SQL_CREATE_RATINGS,
        SQL_CREATE_RATINGS_RATER_INDEX,
    ] {
        sqlx::query(sql).execute(pool).await?;
    }
    Ok(())
}

pub async fn drop_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    for sql in SQL_DROP_TABLES {
        sqlx::query(sql).execute(pool).await?;
    }
    Ok(())
}
