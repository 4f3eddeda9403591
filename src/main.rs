use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use sympathy::config::AppConfig;
use sympathy::database::schema;
use sympathy::security::jwt::JwtManager;
use sympathy::services::notification_service::{LogNotifier, Notifier, SmtpNotifier};
use sympathy::state::AppState;
use sympathy::web;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // 1. Start logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sympathy=debug,tower_http=info"));
    fmt().with_env_filter(env_filter).with_target(true).init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    // 2. Connect to the database and make sure the tables exist
    info!(database_url = %config.database_url, "connecting to database");
    let pool = SqlitePoolOptions::new()
        .connect(&config.database_url)
        .await
        .context("failed to connect to database; check DATABASE_URL")?;
    schema::apply_schema(&pool)
        .await
        .context("failed to apply schema")?;

    // 3. Signing keys and mail delivery
    let jwt = JwtManager::from_config(&config.jwt).context("failed to load JWT keys")?;
    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpNotifier::new(smtp).context("invalid SMTP configuration")?),
        None => Arc::new(LogNotifier),
    };

    let state = AppState::new(pool.clone(), jwt, notifier, config.media.clone());
    let app = web::router(state);

    // 4. Start the server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("cannot parse {}:{}", config.host, config.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {}", addr))?;

    info!("🚀 Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
