pub mod directory_repo;
pub mod rating_repo;
pub mod schema;
pub mod user_repo;

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
