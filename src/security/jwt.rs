use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{is_hmac, JwtConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("failed to read key {path}: {source}")]
    KeyFile {
        path: String,
        source: std::io::Error,
    },
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("missing signing material: {0}")]
    MissingKey(&'static str),
}

/// Signs and verifies access tokens. Keys are loaded once at startup.
#[derive(Clone)]
pub struct JwtManager {
    header: Header,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtManager {
    pub fn from_config(config: &JwtConfig) -> Result<Self, JwtError> {
        let algorithm = config.algorithm;
        let (encoding, decoding) = if is_hmac(algorithm) {
            let secret = config
                .secret
                .as_deref()
                .ok_or(JwtError::MissingKey("JWT_SECRET"))?;
            (
                EncodingKey::from_secret(secret.as_bytes()),
                DecodingKey::from_secret(secret.as_bytes()),
            )
        } else {
            let private_path = config
                .private_key_path
                .as_ref()
                .ok_or(JwtError::MissingKey("JWT_PRIVATE_KEY_PATH"))?;
            let public_path = config
                .public_key_path
                .as_ref()
                .ok_or(JwtError::MissingKey("JWT_PUBLIC_KEY_PATH"))?;
            let private_pem = read_key(private_path)?;
            let public_pem = read_key(public_path)?;
            match algorithm {
                jsonwebtoken::Algorithm::ES256 | jsonwebtoken::Algorithm::ES384 => (
                    EncodingKey::from_ec_pem(&private_pem)?,
                    DecodingKey::from_ec_pem(&public_pem)?,
                ),
                jsonwebtoken::Algorithm::EdDSA => (
                    EncodingKey::from_ed_pem(&private_pem)?,
                    DecodingKey::from_ed_pem(&public_pem)?,
                ),
                _ => (
                    EncodingKey::from_rsa_pem(&private_pem)?,
                    DecodingKey::from_rsa_pem(&public_pem)?,
                ),
            }
        };

        Ok(Self {
            header: Header::new(algorithm),
            encoding,
            decoding,
            validation: Validation::new(algorithm),
            ttl: Duration::minutes(config.access_token_expire_minutes),
        })
    }

    pub fn issue_access(&self, username: &str, email: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            email: email.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        Ok(encode(&self.header, &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

fn read_key(path: &std::path::Path) -> Result<Vec<u8>, JwtError> {
    std::fs::read(path).map_err(|source| JwtError::KeyFile {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::Algorithm;

    fn hmac_config(secret: &str, minutes: i64) -> JwtConfig {
        JwtConfig {
            algorithm: Algorithm::HS256,
            secret: Some(secret.to_string()),
            private_key_path: None,
            public_key_path: None,
            access_token_expire_minutes: minutes,
        }
    }

    #[test]
    fn issued_token_carries_username_and_email() {
        let jwt = JwtManager::from_config(&hmac_config("test-secret", 15)).unwrap();
        let token = jwt.issue_access("alice", "alice@example.com").unwrap();
        let claims = jwt.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = JwtManager::from_config(&hmac_config("one", 15)).unwrap();
        let verifier = JwtManager::from_config(&hmac_config("two", 15)).unwrap();
        let token = issuer.issue_access("alice", "alice@example.com").unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Default validation leeway is 60 seconds.
        let jwt = JwtManager::from_config(&hmac_config("test-secret", -5)).unwrap();
        let token = jwt.issue_access("alice", "alice@example.com").unwrap();
        assert!(jwt.verify(&token).is_err());
    }

    #[test]
    fn missing_key_files_fail_startup() {
        let config = JwtConfig {
            algorithm: Algorithm::RS256,
            secret: None,
            private_key_path: Some("/nonexistent/private.pem".into()),
            public_key_path: Some("/nonexistent/public.pem".into()),
            access_token_expire_minutes: 15,
        };
        assert!(matches!(
            JwtManager::from_config(&config),
            Err(JwtError::KeyFile { .. })
        ));
    }
}
