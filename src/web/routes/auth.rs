use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Form, Json,
};
use cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::services::auth_service;
use crate::state::AppState;
use crate::web::middleware::auth::ACCESS_COOKIE;

#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[derive(Serialize)]
pub struct TokenInfo {
    access_token: String,
    token_type: &'static str,
}

pub async fn login_handler(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let issued =
        auth_service::login(&state.pool, &state.jwt, &form.username, &form.password).await?;
    info!(user_id = issued.user.id, "login");

    let mut access_cookie = Cookie::new(ACCESS_COOKIE, issued.access_token.clone());
    access_cookie.set_path("/");
    access_cookie.set_http_only(true);
    access_cookie.set_same_site(SameSite::Lax);

    let mut response = Json(TokenInfo {
        access_token: issued.access_token,
        token_type: "Bearer",
    })
    .into_response();
    append_cookie(&mut response, &access_cookie);
    Ok(response)
}

pub async fn logout_handler() -> Response {
    let mut access_cookie = Cookie::new(ACCESS_COOKIE, "");
    access_cookie.set_path("/");
    access_cookie.set_http_only(true);
    access_cookie.set_same_site(SameSite::Lax);
    access_cookie.make_removal();

    let mut response = Json(serde_json::json!({ "status": "logged_out" })).into_response();
    append_cookie(&mut response, &access_cookie);
    response
}

fn append_cookie(response: &mut Response, cookie: &Cookie<'_>) {
    if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
}
