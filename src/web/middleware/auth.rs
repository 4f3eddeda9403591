use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use cookie::Cookie;

use crate::error::AppError;
use crate::models::UsersRow;
use crate::services::auth_service::{self, AuthError};
use crate::state::AppState;

pub const ACCESS_COOKIE: &str = "access_token";

#[derive(Clone, Debug)]
pub struct AuthenticatedUser(pub UsersRow);

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Bearer header first, then the cookie set by /api/login.
    let Some(token) = bearer_token(request.headers()).or_else(|| cookie_token(request.headers()))
    else {
        return AppError::from(AuthError::InvalidToken).into_response();
    };

    match auth_service::authenticate(&state.pool, &state.jwt, &token).await {
        Ok(user) => {
            request.extensions_mut().insert(AuthenticatedUser(user));
            next.run(request).await
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    Cookie::split_parse(cookies)
        .filter_map(Result::ok)
        .find(|c| c.name() == ACCESS_COOKIE)
        .map(|c| c.value().to_string())
}
