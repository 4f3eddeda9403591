use sqlx::{sqlite::SqliteArguments, Arguments, SqlitePool};

use crate::models::{DirectoryUserRow, Gender, RegistrationOrder};

pub const SQL_DIRECTORY_BASE: &str = r#"
SELECT
    u.id, u.first_name, u.last_name, u.gender,
    u.latitude, u.longitude, u.created_at
FROM users u
WHERE u.is_active = 1
"#;

pub async fn load_directory_candidates(
    pool: &SqlitePool,
    requester_id: i64,
    gender: Option<Gender>,
    order: Option<RegistrationOrder>,
) -> sqlx::Result<Vec<DirectoryUserRow>> {
    let mut sql = String::from(SQL_DIRECTORY_BASE);
    let mut args = SqliteArguments::default();

    sql.push_str(" AND u.id != ?");
    args.add(requester_id).map_err(sqlx::Error::Encode)?;

    if let Some(gender) = gender {
        sql.push_str(" AND u.gender = ?");
        args.add(gender).map_err(sqlx::Error::Encode)?;
    }

    sql.push_str(match order {
        Some(RegistrationOrder::Latest) => " ORDER BY u.created_at DESC, u.id DESC",
        Some(RegistrationOrder::Earliest) => " ORDER BY u.created_at ASC, u.id ASC",
        None => " ORDER BY u.id ASC",
    });

    sqlx::query_as_with::<_, DirectoryUserRow, _>(&sql, args)
        .fetch_all(pool)
        .await
}
