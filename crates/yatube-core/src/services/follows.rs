use std::sync::Arc;

use crate::domain::User;
use crate::error::DomainError;
use crate::ports::{FollowRepository, UserRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    AlreadyFollowing,
    /// Following yourself is refused; no edge is written.
    SelfFollow,
}

/// Subscribe/unsubscribe between users.
#[derive(Clone)]
pub struct FollowService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl FollowService {
    pub fn new(users: Arc<dyn UserRepository>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { users, follows }
    }

    pub async fn follow(&self, viewer: &User, username: &str) -> Result<FollowOutcome, DomainError> {
        let author = self.find_author(username).await?;
        if author.id == viewer.id {
            tracing::debug!(user = %viewer.username, "Ignoring self-follow");
            return Ok(FollowOutcome::SelfFollow);
        }

        let (_, created) = self.follows.get_or_create(viewer.id, author.id).await?;
        if created {
            tracing::info!(user = %viewer.username, author = %author.username, "Follow created");
            Ok(FollowOutcome::Followed)
        } else {
            Ok(FollowOutcome::AlreadyFollowing)
        }
    }

    /// Remove the edge; `NotFound` when the viewer did not follow `username`.
    pub async fn unfollow(&self, viewer: &User, username: &str) -> Result<(), DomainError> {
        let author = self.find_author(username).await?;
        let follow = self
            .follows
            .find(viewer.id, author.id)
            .await?
            .ok_or_else(|| {
                DomainError::not_found("Follow", format!("{} -> {}", viewer.username, username))
            })?;

        self.follows.delete(follow.id).await?;
        tracing::info!(user = %viewer.username, author = %author.username, "Follow removed");
        Ok(())
    }

    async fn find_author(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("User", username))
    }
}
