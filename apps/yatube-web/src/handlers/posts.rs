//! Post listings, detail, create/edit/delete and comments.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};

use yatube_core::domain::User;
use yatube_core::pagination::PageRequest;
use yatube_core::ports::INDEX_CACHE_PREFIX;
use yatube_core::services::{EditOutcome, Submission};
use yatube_shared::dto::{CommentFormData, PageQuery};

use super::multipart::read_post_form;
use super::{html, post_url, profile_url, redirect};
use crate::middleware::auth::{CurrentUser, MaybeUser};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::templates;

/// The rendered page carries the viewer's navigation, so the key does too.
/// Requests that resolve to the same page share a key; "last" covers page
/// numbers below one.
fn index_cache_key(viewer: Option<&User>, page: Option<&str>) -> String {
    let viewer = viewer
        .map(|u| u.id.to_string())
        .unwrap_or_else(|| "anon".to_string());
    format!(
        "{}{}:{}",
        INDEX_CACHE_PREFIX,
        viewer,
        PageRequest::parse(page)
    )
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    viewer: MaybeUser,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let key = index_cache_key(viewer.user(), query.page.as_deref());
    if let Some(body) = state.cache.get(&key).await {
        tracing::debug!(key = %key, "Index served from cache");
        return Ok(html(body));
    }

    let page = state.posts.index(query.page.as_deref()).await?;
    let body = templates::posts::index(&page, viewer.user());

    let ttl = state.settings.index_cache_ttl;
    if let Err(e) = state.cache.set(&key, &body, Some(ttl)).await {
        tracing::warn!(key = %key, error = %e, "Failed to cache index page");
    }

    Ok(html(body))
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    viewer: MaybeUser,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let view = state
        .posts
        .group_posts(&slug, query.page.as_deref())
        .await?;
    Ok(html(templates::posts::group_list(&view, viewer.user())))
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    viewer: MaybeUser,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let view = state
        .posts
        .profile(&username, viewer.user(), query.page.as_deref())
        .await?;
    Ok(html(templates::posts::profile(&view, viewer.user())))
}

/// GET /posts/{id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    viewer: MaybeUser,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let view = state
        .posts
        .post_detail(post_id.into_inner(), viewer.user())
        .await?;
    Ok(html(templates::posts::post_detail(&view, viewer.user())))
}

/// GET /create/
pub async fn post_create_form(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<HttpResponse> {
    let view = state.posts.new_post_form().await?;
    Ok(html(templates::posts::create_post(&view, Some(&user))))
}

/// POST /create/
pub async fn post_create(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let (data, image) = read_post_form(payload, state.posts.max_upload_bytes()).await?;

    match state.posts.create_post(&user, data, image).await? {
        Submission::Accepted(_) => Ok(redirect(profile_url(&user.username))),
        Submission::Rejected(view) => Ok(html(templates::posts::create_post(&view, Some(&user)))),
    }
}

/// GET /posts/{id}/edit/
pub async fn post_edit_form(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post_id = post_id.into_inner();
    match state.posts.edit_post_form(&user, post_id).await? {
        Some(view) => Ok(html(templates::posts::create_post(&view, Some(&user)))),
        None => Ok(redirect(post_url(post_id))),
    }
}

/// POST /posts/{id}/edit/
pub async fn post_edit(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    post_id: web::Path<i64>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let post_id = post_id.into_inner();
    let (data, image) = read_post_form(payload, state.posts.max_upload_bytes()).await?;

    match state.posts.edit_post(&user, post_id, data, image).await? {
        EditOutcome::NotAuthor | EditOutcome::Saved(_) => Ok(redirect(post_url(post_id))),
        EditOutcome::Rejected(view) => Ok(html(templates::posts::create_post(&view, Some(&user)))),
    }
}

/// POST /posts/{id}/delete/
pub async fn post_delete(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post_id = post_id.into_inner();
    if state.posts.delete_post(&user, post_id).await? {
        Ok(redirect(profile_url(&user.username)))
    } else {
        Ok(redirect(post_url(post_id)))
    }
}

/// POST /posts/{id}/comment/
pub async fn add_comment(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    post_id: web::Path<i64>,
    form: web::Form<CommentFormData>,
) -> AppResult<HttpResponse> {
    let post_id = post_id.into_inner();
    state
        .posts
        .add_comment(&user, post_id, form.into_inner())
        .await?;
    Ok(redirect(post_url(post_id)))
}
