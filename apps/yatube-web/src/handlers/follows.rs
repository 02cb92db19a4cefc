//! Follow feed and subscribe/unsubscribe.

use actix_web::{HttpResponse, web};

use yatube_shared::dto::PageQuery;

use super::{html, redirect};
use crate::middleware::auth::CurrentUser;
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::templates;

const FOLLOW_FEED: &str = "/follow/";

/// GET /follow/
pub async fn follow_index(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .posts
        .follow_feed(&user, query.page.as_deref())
        .await?;
    Ok(html(templates::posts::follow(&page, Some(&user))))
}

/// POST /profile/{username}/follow/
pub async fn profile_follow(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.follows.follow(&user, &username).await?;
    Ok(redirect(FOLLOW_FEED))
}

/// POST /profile/{username}/unfollow/
pub async fn profile_unfollow(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.follows.unfollow(&user, &username).await?;
    Ok(redirect(FOLLOW_FEED))
}
