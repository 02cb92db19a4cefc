//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use yatube_core::pagination::DEFAULT_PAGE_SIZE;
use yatube_core::services::PostSettings;
use yatube_infra::{JwtConfig, RateLimitConfig};

#[cfg(feature = "postgres")]
use yatube_infra::DatabaseConfig;
#[cfg(feature = "redis")]
use yatube_infra::RedisConfig;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "redis")]
    pub redis: Option<RedisConfig>,
    pub session: JwtConfig,
    pub auth_rate_limit: RateLimitConfig,
    pub web: WebSettings,
    pub posts: PostSettings,
}

/// Knobs the request handlers read at runtime.
#[derive(Debug, Clone)]
pub struct WebSettings {
    /// How long a rendered index page is served from cache.
    pub index_cache_ttl: Duration,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
    pub media_root: PathBuf,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            index_cache_ttl: Duration::from_secs(20),
            secure_cookies: false,
            media_root: PathBuf::from("media"),
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let web = WebSettings {
            index_cache_ttl: Duration::from_secs(parsed("INDEX_CACHE_SECONDS").unwrap_or(20)),
            secure_cookies: env::var("SESSION_COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("media")),
        };

        let posts = PostSettings {
            page_size: parsed("PAGE_SIZE").unwrap_or(DEFAULT_PAGE_SIZE),
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES").unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT").unwrap_or(8080),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            #[cfg(feature = "redis")]
            redis: env::var("REDIS_URL").ok().map(|_| RedisConfig::from_env()),
            session: JwtConfig::from_env(),
            auth_rate_limit: RateLimitConfig::from_env(),
            web,
            posts,
        }
    }
}
