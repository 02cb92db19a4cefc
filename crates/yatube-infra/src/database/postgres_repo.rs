//! PostgreSQL repository implementations.
//!
//! Cascades (user -> posts, comments, follows; post -> comments) and
//! `SET NULL` on group deletion are enforced by the schema's foreign keys.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, Unchanged,
};

use yatube_core::domain::{
    Comment, Follow, Group, NewComment, NewGroup, NewPost, NewUser, Post, User,
};
use yatube_core::error::RepoError;
use yatube_core::ports::{
    CommentRepository, FollowRepository, GroupRepository, PostFilter, PostRepository,
    UserRepository,
};
use yatube_core::services::Repositories;

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::follow::{self, Entity as FollowEntity};
use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_err, write_err};

pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;
pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;
pub type PostgresFollowRepository = PostgresBaseRepository<FollowEntity>;

/// One connection pool shared by all repositories.
#[derive(Clone)]
pub struct PostgresStore {
    db: DbConn,
}

impl PostgresStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DbConn {
        &self.db
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(PostgresUserRepository::new(self.db.clone())),
            groups: Arc::new(PostgresGroupRepository::new(self.db.clone())),
            posts: Arc::new(PostgresPostRepository::new(self.db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(self.db.clone())),
            follows: Arc::new(PostgresFollowRepository::new(self.db.clone())),
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let model = user::ActiveModel {
            username: Set(new_user.username),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            date_joined: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err)?;

        Ok(model.into())
    }

    async fn set_password(&self, id: i64, password_hash: &str) -> Result<(), RepoError> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(write_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<Group>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = GroupEntity::find()
            .filter(group::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .order_by_asc(group::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, new_group: NewGroup) -> Result<Group, RepoError> {
        let model = group::ActiveModel {
            title: Set(new_group.title),
            slug: Set(new_group.slug),
            description: Set(new_group.description),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err)?;

        Ok(model.into())
    }
}

fn post_condition(filter: PostFilter) -> Condition {
    match filter {
        PostFilter::All => Condition::all(),
        PostFilter::Group(group_id) => Condition::all().add(post::Column::GroupId.eq(group_id)),
        PostFilter::Author(author_id) => {
            Condition::all().add(post::Column::AuthorId.eq(author_id))
        }
        PostFilter::FollowedBy(user_id) => Condition::all().add(
            post::Column::AuthorId.in_subquery(
                Query::select()
                    .column(follow::Column::AuthorId)
                    .from(FollowEntity)
                    .and_where(follow::Column::UserId.eq(user_id))
                    .to_owned(),
            ),
        ),
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(new_post)
            .insert(&self.db)
            .await
            .map_err(write_err)?;

        Ok(model.into())
    }

    async fn update(&self, post: &Post) -> Result<Post, RepoError> {
        // Author and creation time stay NotSet and are never written.
        let model = post::ActiveModel {
            id: Unchanged(post.id),
            text: Set(post.content.text.clone()),
            group_id: Set(post.group_id),
            image: Set(post.image.clone()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(write_err)?;

        Ok(model.into())
    }

    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post_condition(filter))
            .count(&self.db)
            .await
            .map_err(query_err)
    }

    async fn list(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post_condition(filter))
            .order_by_desc(post::Column::Created)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, new_comment: NewComment) -> Result<Comment, RepoError> {
        let model = comment::ActiveModel::from(new_comment)
            .insert(&self.db)
            .await
            .map_err(write_err)?;

        Ok(model.into())
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_desc(comment::Column::Created)
            .order_by_desc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn find(&self, user_id: i64, author_id: i64) -> Result<Option<Follow>, RepoError> {
        let result = FollowEntity::find()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn get_or_create(
        &self,
        user_id: i64,
        author_id: i64,
    ) -> Result<(Follow, bool), RepoError> {
        if let Some(existing) = self.find(user_id, author_id).await? {
            return Ok((existing, false));
        }

        let inserted = follow::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await;

        match inserted {
            Ok(model) => Ok((model.into(), true)),
            Err(e) => match write_err(e) {
                // A concurrent request inserted the same pair first.
                RepoError::Constraint(_) => self
                    .find(user_id, author_id)
                    .await?
                    .map(|follow| (follow, false))
                    .ok_or(RepoError::NotFound),
                other => Err(other),
            },
        }
    }
}
