use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("{0} must be set for the configured JWT algorithm")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub media: MediaConfig,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub algorithm: Algorithm,
    pub secret: Option<String>,
    pub private_key_path: Option<PathBuf>,
    pub public_key_path: Option<PathBuf>,
    pub access_token_expire_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub avatar_dir: PathBuf,
    pub watermark_path: PathBuf,
    pub position: (i64, i64),
    pub transparency: f32,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt = JwtConfig {
            algorithm: try_load("JWT_ALGORITHM", "HS256")?,
            secret: env_string("JWT_SECRET"),
            private_key_path: env_string("JWT_PRIVATE_KEY_PATH").map(PathBuf::from),
            public_key_path: env_string("JWT_PUBLIC_KEY_PATH").map(PathBuf::from),
            access_token_expire_minutes: try_load("ACCESS_TOKEN_EXPIRE_MINUTES", "15")?,
        };

        if is_hmac(jwt.algorithm) {
            if jwt.secret.is_none() {
                return Err(ConfigError::Missing("JWT_SECRET"));
            }
        } else {
            if jwt.private_key_path.is_none() {
                return Err(ConfigError::Missing("JWT_PRIVATE_KEY_PATH"));
            }
            if jwt.public_key_path.is_none() {
                return Err(ConfigError::Missing("JWT_PUBLIC_KEY_PATH"));
            }
        }

        Ok(Self {
            database_url: env_string("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://sympathy.db?mode=rwc".to_string()),
            host: env_string("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: try_load("PORT", "3000")?,
            jwt,
            media: MediaConfig {
                avatar_dir: PathBuf::from(
                    env_string("AVATAR_DIR").unwrap_or_else(|| "photo/avatar".to_string()),
                ),
                watermark_path: PathBuf::from(
                    env_string("WATERMARK_PATH")
                        .unwrap_or_else(|| "photo/watermark/watermark.png".to_string()),
                ),
                ..MediaConfig::default()
            },
            smtp: smtp_from_env()?,
        })
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            avatar_dir: PathBuf::from("photo/avatar"),
            watermark_path: PathBuf::from("photo/watermark/watermark.png"),
            position: (50, 50),
            transparency: 0.5,
        }
    }
}

pub fn is_hmac(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}

fn smtp_from_env() -> Result<Option<SmtpConfig>, ConfigError> {
    let (Some(host), Some(username), Some(password)) = (
        env_string("SMTP_HOST"),
        env_string("SMTP_USERNAME"),
        env_string("SMTP_PASSWORD"),
    ) else {
        warn!("SMTP not configured; mutual match emails will only be logged");
        return Ok(None);
    };

    Ok(Some(SmtpConfig {
        port: try_load("SMTP_PORT", "587")?,
        from: env_string("SMTP_FROM").unwrap_or_else(|| username.clone()),
        host,
        username,
        password,
    }))
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError> {
    let raw = env_string(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    parse_value(key, &raw)
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_algorithm_names() {
        let alg: Algorithm = parse_value("JWT_ALGORITHM", "RS256").unwrap();
        assert_eq!(alg, Algorithm::RS256);
        assert!(!is_hmac(alg));
        assert!(is_hmac(parse_value("JWT_ALGORITHM", "HS512").unwrap()));
    }

    #[test]
    fn rejects_garbage_port() {
        let err = parse_value::<u16>("PORT", "eighty").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn media_defaults_follow_watermark_layout() {
        let media = MediaConfig::default();
        assert_eq!(media.position, (50, 50));
        assert_eq!(media.transparency, 0.5);
    }
}
