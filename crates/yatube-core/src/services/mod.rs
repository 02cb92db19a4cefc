//! Services - the logic behind each page, written against the ports.
//!
//! Handlers translate HTTP into calls here and render what comes back;
//! everything that decides *what* happens (authorization, validation,
//! ordering, pagination) lives in this module.

mod accounts;
mod follows;
mod posts;

use std::sync::Arc;

use crate::ports::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

pub use accounts::{AccountService, Session};
pub use follows::{FollowOutcome, FollowService};
pub use posts::{EditOutcome, PostService, PostSettings};

/// The full set of repositories, usually all backed by one store.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

/// Result of submitting a form: the saved value, or whatever the form page
/// must be redisplayed with.
#[derive(Debug)]
pub enum Submission<T, R> {
    Accepted(T),
    Rejected(R),
}

impl<T, R> Submission<T, R> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted(_))
    }
}
