use axum::{
    extract::DefaultBodyLimit,
    routing::{get, get_service, post},
    Json, Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod middleware;
pub mod routes;

use self::middleware::auth as auth_middleware;
use self::routes::{auth, rating, registration, user};

const MAX_AVATAR_UPLOAD: usize = 10 * 1024 * 1024;
pub const AVATAR_ROUTE: &str = "/photo/avatar";

pub fn router(state: AppState) -> Router {
    // Protected routes under one middleware layer
    let protected_routes = Router::new()
        .route("/api/users/me", get(user::me_handler))
        .route("/api/list", get(user::list_users_handler))
        .route("/api/clients/:id/match", post(rating::rate_user_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::require_auth,
        ));

    let avatars = get_service(ServeDir::new(&state.media.avatar_dir)).layer(
        SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=3600"),
        ),
    );

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({ "status": "ok" })) }))
        .route(
            "/api/clients/create",
            post(registration::registration_handler)
                .layer(DefaultBodyLimit::max(MAX_AVATAR_UPLOAD)),
        )
        .route("/api/login", post(auth::login_handler))
        .route("/api/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .nest_service(AVATAR_ROUTE, avatars)
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
