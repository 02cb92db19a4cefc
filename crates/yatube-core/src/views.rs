//! Page contexts - everything a template needs, already joined and ordered.

use chrono::{DateTime, Utc};
use serde::Serialize;

use yatube_shared::dto::{CommentFormData, PostFormData};

use crate::domain::{Comment, Group, Post, User};
use crate::forms::BoundForm;
use crate::pagination::Page;

/// How a user is shown next to their writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRef {
    pub id: i64,
    pub username: String,
    pub display_name: String,
}

impl From<&User> for AuthorRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRef {
    pub slug: String,
    pub title: String,
}

impl From<&Group> for GroupRef {
    fn from(group: &Group) -> Self {
        Self {
            slug: group.slug.clone(),
            title: group.title.clone(),
        }
    }
}

/// A post joined with its author and group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostCard {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: AuthorRef,
    pub group: Option<GroupRef>,
    pub image: Option<String>,
}

impl PostCard {
    pub fn new(post: &Post, author: AuthorRef, group: Option<GroupRef>) -> Self {
        Self {
            id: post.id,
            text: post.content.text.clone(),
            pub_date: post.content.created,
            author,
            group,
            image: post.image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentCard {
    pub id: i64,
    pub text: String,
    pub created: DateTime<Utc>,
    pub author: AuthorRef,
}

impl CommentCard {
    pub fn new(comment: &Comment, author: AuthorRef) -> Self {
        Self {
            id: comment.id,
            text: comment.content.text.clone(),
            created: comment.content.created,
            author,
        }
    }
}

/// `posts/group_list.html`
#[derive(Debug, Clone, Serialize)]
pub struct GroupPage {
    pub group: Group,
    pub page: Page<PostCard>,
}

/// `posts/profile.html`
#[derive(Debug, Clone, Serialize)]
pub struct ProfilePage {
    pub author: AuthorRef,
    pub page: Page<PostCard>,
    /// Whether the viewer follows this author. Always false for anonymous
    /// viewers.
    pub following: bool,
    /// Whether the follow/unfollow button applies (signed in, not self).
    pub can_follow: bool,
}

/// `posts/post_detail.html`
#[derive(Debug, Clone, Serialize)]
pub struct PostDetailPage {
    pub post: PostCard,
    pub author_post_count: u64,
    pub comments: Vec<CommentCard>,
    pub form: BoundForm<CommentFormData>,
    pub can_edit: bool,
}

/// `posts/create_post.html`, used for both create and edit.
#[derive(Debug, Clone, Serialize)]
pub struct PostFormPage {
    pub form: BoundForm<PostFormData>,
    pub groups: Vec<Group>,
    pub is_edit: bool,
    pub post_id: Option<i64>,
    pub current_image: Option<String>,
}
