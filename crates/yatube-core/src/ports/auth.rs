//! Authentication ports: session tokens and password hashing.

use std::time::Duration;

/// What a session token proves about its bearer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: i64,
    pub username: String,
    pub exp: i64,
}

/// Issues and checks the signed token stored in the session cookie.
pub trait SessionTokens: Send + Sync {
    /// Issue a token for a freshly authenticated user.
    fn issue(&self, user_id: i64, username: &str) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate(&self, token: &str) -> Result<SessionClaims, AuthError>;

    /// How long an issued token stays valid.
    fn lifetime(&self) -> Duration;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session expired")]
    TokenExpired,

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Hashing error: {0}")]
    HashingError(String),
}
