//! Application state - shared across all handlers.

use std::sync::Arc;

use yatube_core::ports::{Cache, MediaStorage, PasswordService, RateLimiter, SessionTokens};
use yatube_core::services::{
    AccountService, FollowService, PostService, PostSettings, Repositories,
};
use yatube_infra::{
    Argon2PasswordService, InMemoryCache, InMemoryRateLimiter, InMemoryStore, JwtSessionTokens,
    LocalMediaStorage, RateLimitConfig,
};

use crate::config::{AppConfig, WebSettings};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub follows: FollowService,
    pub accounts: AccountService,
    /// Rendered index pages.
    pub cache: Arc<dyn Cache>,
    pub media: Arc<dyn MediaStorage>,
    /// Throttles login and signup submissions per client.
    pub auth_limiter: Arc<dyn RateLimiter>,
    pub settings: Arc<WebSettings>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let repos = Self::repositories(config).await;
        let cache = Self::cache(config).await;

        tracing::info!("Application state initialized");

        Self::assemble(
            repos,
            cache,
            Arc::new(JwtSessionTokens::new(config.session.clone())),
            Arc::new(Argon2PasswordService::new()),
            config.auth_rate_limit.clone(),
            config.posts,
            config.web.clone(),
        )
    }

    /// Everything in memory; the store is handed back for seeding.
    #[cfg(test)]
    pub fn in_memory(settings: WebSettings) -> (Self, InMemoryStore) {
        use yatube_infra::JwtConfig;

        let store = InMemoryStore::new();
        let state = Self::assemble(
            store.repositories(),
            Arc::new(InMemoryCache::new()),
            Arc::new(JwtSessionTokens::new(JwtConfig::default())),
            Arc::new(Argon2PasswordService::new()),
            RateLimitConfig {
                max_requests: 1000,
                ..RateLimitConfig::default()
            },
            PostSettings::default(),
            settings,
        );
        (state, store)
    }

    fn assemble(
        repos: Repositories,
        cache: Arc<dyn Cache>,
        tokens: Arc<dyn SessionTokens>,
        passwords: Arc<dyn PasswordService>,
        rate_limit: RateLimitConfig,
        post_settings: PostSettings,
        settings: WebSettings,
    ) -> Self {
        let media: Arc<dyn MediaStorage> =
            Arc::new(LocalMediaStorage::new(settings.media_root.clone()));

        Self {
            posts: PostService::new(repos.clone(), media.clone(), post_settings),
            follows: FollowService::new(repos.users.clone(), repos.follows.clone()),
            accounts: AccountService::new(repos.users.clone(), passwords, tokens),
            cache,
            media,
            auth_limiter: Arc::new(InMemoryRateLimiter::new(rate_limit)),
            settings: Arc::new(settings),
        }
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> Repositories {
        use yatube_infra::PostgresStore;
        use yatube_infra::database::connect;

        match &config.database {
            Some(db_config) => match connect(db_config).await {
                Ok(db) => return PostgresStore::new(db).repositories(),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to connect to database. Using in-memory store.");
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running with the in-memory store.");
            }
        }
        InMemoryStore::new().repositories()
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(_config: &AppConfig) -> Repositories {
        tracing::info!("Running without postgres feature - using in-memory store");
        InMemoryStore::new().repositories()
    }

    #[cfg(feature = "redis")]
    async fn cache(config: &AppConfig) -> Arc<dyn Cache> {
        use yatube_infra::RedisCache;

        if let Some(redis_config) = &config.redis {
            match RedisCache::new(redis_config).await {
                Ok(cache) => return Arc::new(cache),
                Err(e) => {
                    tracing::error!(error = %e, "Redis unavailable. Falling back to in-memory cache.");
                }
            }
        }
        Arc::new(InMemoryCache::new())
    }

    #[cfg(not(feature = "redis"))]
    async fn cache(_config: &AppConfig) -> Arc<dyn Cache> {
        Arc::new(InMemoryCache::new())
    }
}
