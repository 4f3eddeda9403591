use anyhow::Context;
use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use std::env;

use sympathy::database::schema;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let db_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://sympathy.db?mode=rwc".to_string());
    let reset = env::args().any(|a| a == "--reset");

    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .with_context(|| format!("cannot connect to {}", db_url))?;

    if reset {
        schema::drop_schema(&pool)
            .await
            .context("failed to drop tables")?;
        tracing::warn!("dropped users and ratings tables");
    }
    schema::apply_schema(&pool)
        .await
        .context("failed to create tables")?;

    println!("schema ready: {} (reset={})", db_url, reset);
    pool.close().await;
    Ok(())
}
