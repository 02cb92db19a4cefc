use async_trait::async_trait;

use crate::domain::{
    Comment, Follow, Group, NewComment, NewGroup, NewPost, NewUser, Post, User,
};
use crate::error::RepoError;

/// Operations every stored entity supports.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. `RepoError::NotFound` if nothing matched.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i64> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<User>, RepoError>;

    /// Store a new user. `RepoError::Constraint` if the username is taken.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;

    async fn set_password(&self, id: i64, password_hash: &str) -> Result<(), RepoError>;
}

/// Group repository. Deleting a group detaches its posts.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, i64> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<Group>, RepoError>;

    /// All groups ordered by title.
    async fn list(&self) -> Result<Vec<Group>, RepoError>;

    /// Store a new group. `RepoError::Constraint` if the slug is taken.
    async fn create(&self, group: NewGroup) -> Result<Group, RepoError>;
}

/// Which posts a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(i64),
    /// Posts by authors the given user follows.
    FollowedBy(i64),
}

/// Post repository. Listings are newest-first (`created` desc, then id desc).
/// Deleting a post deletes its comments.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Persist text, group and image of an existing post. The author and
    /// creation time never change.
    async fn update(&self, post: &Post) -> Result<Post, RepoError>;

    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError>;

    async fn list(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, i64> {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError>;

    /// Comments of one post, newest-first.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError>;
}

/// Follow edges. A `(user, author)` pair exists at most once.
#[async_trait]
pub trait FollowRepository: BaseRepository<Follow, i64> {
    async fn find(&self, user_id: i64, author_id: i64) -> Result<Option<Follow>, RepoError>;

    /// Return the existing edge or create it. The flag is `true` when a row
    /// was inserted.
    async fn get_or_create(&self, user_id: i64, author_id: i64)
    -> Result<(Follow, bool), RepoError>;
}
