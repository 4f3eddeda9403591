use sqlx::SqlitePool;
use thiserror::Error;
use tracing::warn;

use crate::database::user_repo;
use crate::models::UsersRow;
use crate::security::jwt::{JwtError, JwtManager};
use crate::security::password::{self, PasswordError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("user inactive")]
    Inactive,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error("store unavailable: {0}")]
    Store(#[from] sqlx::Error),
}

pub struct IssuedToken {
    pub access_token: String,
    pub user: UsersRow,
}

pub async fn login(
    pool: &SqlitePool,
    jwt: &JwtManager,
    username: &str,
    plain_password: &str,
) -> Result<IssuedToken, AuthError> {
    let Some(user) = user_repo::find_user_by_username(pool, username.trim()).await? else {
        return Err(AuthError::InvalidCredentials);
    };
    if !password::verify_password(plain_password, &user.password)? {
        return Err(AuthError::InvalidCredentials);
    }
    if !user.is_active {
        return Err(AuthError::Inactive);
    }

    let access_token = jwt.issue_access(&user.username, &user.email)?;
    Ok(IssuedToken { access_token, user })
}

/// Resolves a bearer token to an active user.
pub async fn authenticate(
    pool: &SqlitePool,
    jwt: &JwtManager,
    token: &str,
) -> Result<UsersRow, AuthError> {
    let claims = jwt.verify(token).map_err(|e| {
        warn!(error = %e, "rejected access token");
        AuthError::InvalidToken
    })?;
    let user = user_repo::find_user_by_username(pool, &claims.sub)
        .await?
        .ok_or(AuthError::InvalidToken)?;
    if !user.is_active {
        return Err(AuthError::Inactive);
    }
    Ok(user)
}
