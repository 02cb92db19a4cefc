//! Signed session tokens carried in the session cookie.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use yatube_core::ports::{AuthError, SessionClaims, SessionTokens};

const DEFAULT_SECRET: &str = "change-me-in-production";

/// Session token configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            // Two weeks, the usual session cookie age.
            expiration_hours: 336,
            issuer: "yatube".to_string(),
        }
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let secret = std::env::var("SESSION_SECRET").unwrap_or_else(|_| DEFAULT_SECRET.to_string());

        if secret == DEFAULT_SECRET {
            let is_production = std::env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default session secret in production! Set SESSION_SECRET."
                );
            } else {
                tracing::warn!("Using default session secret. Set SESSION_SECRET for production use.");
            }
        }

        Self {
            secret,
            expiration_hours: std::env::var("SESSION_EXPIRATION_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(336),
            issuer: "yatube".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user id
    username: String,
    exp: i64,
    iat: i64,
    iss: String,
}

/// HS256-signed session tokens.
pub struct JwtSessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl JwtSessionTokens {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(JwtConfig::from_env())
    }
}

impl SessionTokens for JwtSessionTokens {
    fn issue(&self, user_id: i64, username: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + TimeDelta::hours(self.config.expiration_hours);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn validate(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let user_id = token_data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(SessionClaims {
            user_id,
            username: token_data.claims.username,
            exp: token_data.claims.exp,
        })
    }

    fn lifetime(&self) -> Duration {
        Duration::from_secs(self.config.expiration_hours.max(0) as u64 * 3600)
    }
}
