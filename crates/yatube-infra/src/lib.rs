//! # Yatube Infrastructure
//!
//! Concrete implementations of the ports defined in `yatube-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - In-memory store and cache only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `auth` - JWT session tokens + Argon2 password hashing
//! - `rate-limit` - Per-client throttling via governor
//! - `redis` - Redis-backed page cache

pub mod cache;
pub mod database;
pub mod media;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use database::InMemoryStore;
pub use media::LocalMediaStorage;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtSessionTokens};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, PostgresStore};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
