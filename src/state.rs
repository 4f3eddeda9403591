use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::MediaConfig;
use crate::security::jwt::JwtManager;
use crate::services::notification_service::Notifier;

/// Everything a request handler needs, built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt: Arc<JwtManager>,
    pub notifier: Arc<dyn Notifier>,
    pub media: Arc<MediaConfig>,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        jwt: JwtManager,
        notifier: Arc<dyn Notifier>,
        media: MediaConfig,
    ) -> Self {
        Self {
            pool,
            jwt: Arc::new(jwt),
            notifier,
            media: Arc::new(media),
        }
    }
}
