use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

use yatube_core::domain::{NewPost, Post};
use yatube_core::error::RepoError;
use yatube_core::ports::{BaseRepository, FollowRepository, PostFilter, PostRepository};

use crate::database::entity::{follow, post};
use crate::database::postgres_repo::{PostgresFollowRepository, PostgresPostRepository};

fn post_model(id: i64, text: &str) -> post::Model {
    post::Model {
        id,
        author_id: 7,
        text: text.to_owned(),
        created: Utc::now().into(),
        group_id: None,
        image: None,
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(1, "Test Post")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let post: Post = repo.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(post.id, 1);
    assert_eq!(post.author_id(), 7);
    assert_eq!(post.content.text, "Test Post");
}

#[tokio::test]
async fn test_list_followed_posts_uses_subquery_and_order() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(2, "newer"), post_model(1, "older")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db.clone());
    let posts = repo.list(PostFilter::FollowedBy(3), 10, 10).await.unwrap();
    assert_eq!(posts.len(), 2);

    let log = db.into_transaction_log();
    let sql = format!("{:?}", log[0]);
    assert!(sql.contains("IN (SELECT"), "{sql}");
    assert!(sql.contains("follows"), "{sql}");
    assert!(sql.contains("ORDER BY"), "{sql}");
    assert!(sql.contains("DESC"), "{sql}");
}

#[tokio::test]
async fn test_create_post_returns_stored_row() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(5, "fresh")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post = PostRepository::create(&repo, NewPost::new(7, "fresh")).await.unwrap();
    assert_eq!(post.id, 5);
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = BaseRepository::<Post, i64>::delete(&repo, 42).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_get_or_create_returns_existing_follow() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![follow::Model {
            id: 9,
            user_id: 1,
            author_id: 2,
        }]])
        .into_connection();

    let repo = PostgresFollowRepository::new(db);
    let (follow, created) = repo.get_or_create(1, 2).await.unwrap();
    assert_eq!(follow.id, 9);
    assert!(!created);
}
