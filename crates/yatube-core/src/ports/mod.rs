//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod cache;
mod media;
mod rate_limit;
mod repository;

pub use auth::{AuthError, PasswordService, SessionClaims, SessionTokens};
pub use cache::{Cache, CacheError, INDEX_CACHE_PREFIX};
pub use media::{MediaError, MediaStorage, Upload};
pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
pub use repository::{
    BaseRepository, CommentRepository, FollowRepository, GroupRepository, PostFilter,
    PostRepository, UserRepository,
};
