//! Process-local store implementing every repository port.
//!
//! Used when `DATABASE_URL` is unset, and by the service tests. It mirrors
//! the relational rules of the Postgres schema: unique usernames, slugs and
//! follow pairs, cascading deletes from users and posts, and group deletion
//! detaching posts.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use yatube_core::domain::{
    Comment, Follow, Group, NewComment, NewGroup, NewPost, NewUser, Post, User,
};
use yatube_core::error::RepoError;
use yatube_core::ports::{
    BaseRepository, CommentRepository, FollowRepository, GroupRepository, PostFilter,
    PostRepository, UserRepository,
};
use yatube_core::services::Repositories;


struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Default)]
struct Tables {
    users: Table<User>,
    groups: Table<Group>,
    posts: Table<Post>,
    comments: Table<Comment>,
    follows: Table<Follow>,
}

impl Tables {
    fn matches(&self, post: &Post, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(group_id) => post.group_id == Some(group_id),
            PostFilter::Author(author_id) => post.author_id() == author_id,
            PostFilter::FollowedBy(user_id) => self
                .follows
                .rows
                .values()
                .any(|f| f.user_id == user_id && f.author_id == post.author_id()),
        }
    }

    fn remove_post(&mut self, post_id: i64) -> Option<Post> {
        let post = self.posts.rows.remove(&post_id)?;
        self.comments.rows.retain(|_, c| c.post_id != post_id);
        Some(post)
    }

    fn remove_user(&mut self, user_id: i64) -> Option<User> {
        let user = self.users.rows.remove(&user_id)?;

        let owned: Vec<i64> = self
            .posts
            .rows
            .values()
            .filter(|p| p.author_id() == user_id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            self.remove_post(post_id);
        }

        self.comments.rows.retain(|_, c| c.content.author_id != user_id);
        self.follows
            .rows
            .retain(|_, f| f.user_id != user_id && f.author_id != user_id);
        Some(user)
    }

    fn remove_group(&mut self, group_id: i64) -> Option<Group> {
        let group = self.groups.rows.remove(&group_id)?;
        for post in self.posts.rows.values_mut() {
            if post.group_id == Some(group_id) {
                post.group_id = None;
            }
        }
        Some(group)
    }
}

/// Shared in-memory tables. Cloning shares the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All five repositories backed by this store.
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(self.clone()),
            groups: Arc::new(self.clone()),
            posts: Arc::new(self.clone()),
            comments: Arc::new(self.clone()),
            follows: Arc::new(self.clone()),
        }
    }
}

fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, i64)) {
    rows.sort_by_key(|row| Reverse(key(row)));
}

// ---------------------------------------------------------------- users

#[async_trait]
impl BaseRepository<User, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.remove_user(id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.rows.get(id).cloned())
            .collect())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.rows.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint(format!(
                "username {:?} already exists",
                user.username
            )));
        }

        let id = tables.users.next_id();
        let user = User {
            id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            date_joined: Utc::now(),
        };
        tables.users.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn set_password(&self, id: i64, password_hash: &str) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }
}

// ---------------------------------------------------------------- groups

#[async_trait]
impl BaseRepository<Group, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, RepoError> {
        Ok(self.tables.read().await.groups.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.remove_group(id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.rows.values().find(|g| g.slug == slug).cloned())
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.groups.rows.get(id).cloned())
            .collect())
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.tables.read().await;
        let mut groups: Vec<Group> = tables.groups.rows.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn create(&self, group: NewGroup) -> Result<Group, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.groups.rows.values().any(|g| g.slug == group.slug) {
            return Err(RepoError::Constraint(format!(
                "slug {:?} already exists",
                group.slug
            )));
        }

        let id = tables.groups.next_id();
        let group = Group {
            id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        tables.groups.rows.insert(id, group.clone());
        Ok(group)
    }
}

// ---------------------------------------------------------------- posts

#[async_trait]
impl BaseRepository<Post, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.remove_post(id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.rows.contains_key(&post.content.author_id) {
            return Err(RepoError::Constraint("post author does not exist".into()));
        }
        if let Some(group_id) = post.group_id {
            if !tables.groups.rows.contains_key(&group_id) {
                return Err(RepoError::Constraint("post group does not exist".into()));
            }
        }

        let id = tables.posts.next_id();
        let post = Post {
            id,
            content: post.content,
            group_id: post.group_id,
            image: post.image,
        };
        tables.posts.rows.insert(id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: &Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let stored = tables.posts.rows.get_mut(&post.id).ok_or(RepoError::NotFound)?;

        stored.content.text = post.content.text.clone();
        stored.group_id = post.group_id;
        stored.image = post.image.clone();
        Ok(stored.clone())
    }

    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .rows
            .values()
            .filter(|p| tables.matches(p, filter))
            .count() as u64)
    }

    async fn list(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .rows
            .values()
            .filter(|p| tables.matches(p, filter))
            .cloned()
            .collect();
        newest_first(&mut posts, |p| (p.content.created, p.id));

        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

// ---------------------------------------------------------------- comments

#[async_trait]
impl BaseRepository<Comment, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .comments
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.rows.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint("comment post does not exist".into()));
        }
        if !tables.users.rows.contains_key(&comment.content.author_id) {
            return Err(RepoError::Constraint("comment author does not exist".into()));
        }

        let id = tables.comments.next_id();
        let comment = Comment {
            id,
            post_id: comment.post_id,
            content: comment.content,
        };
        tables.comments.rows.insert(id, comment.clone());
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .rows
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        newest_first(&mut comments, |c| (c.content.created, c.id));
        Ok(comments)
    }
}

// ---------------------------------------------------------------- follows

#[async_trait]
impl BaseRepository<Follow, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Follow>, RepoError> {
        Ok(self.tables.read().await.follows.rows.get(&id).copied())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .follows
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl FollowRepository for InMemoryStore {
    async fn find(&self, user_id: i64, author_id: i64) -> Result<Option<Follow>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .rows
            .values()
            .find(|f| f.user_id == user_id && f.author_id == author_id)
            .copied())
    }

    async fn get_or_create(
        &self,
        user_id: i64,
        author_id: i64,
    ) -> Result<(Follow, bool), RepoError> {
        // Check and insert under one write lock so the pair stays unique.
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables
            .follows
            .rows
            .values()
            .find(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Ok((*existing, false));
        }
        if !tables.users.rows.contains_key(&user_id) || !tables.users.rows.contains_key(&author_id)
        {
            return Err(RepoError::Constraint("follow user does not exist".into()));
        }

        let id = tables.follows.next_id();
        let follow = Follow {
            id,
            user_id,
            author_id,
        };
        tables.follows.rows.insert(id, follow);
        Ok((follow, true))
    }
}
