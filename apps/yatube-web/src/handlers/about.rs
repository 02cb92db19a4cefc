//! Static pages.

use actix_web::HttpResponse;

use super::html;
use crate::middleware::auth::MaybeUser;
use crate::templates;

/// GET /about/author/
pub async fn author(viewer: MaybeUser) -> HttpResponse {
    html(templates::about::author(viewer.user()))
}

/// GET /about/tech/
pub async fn tech(viewer: MaybeUser) -> HttpResponse {
    html(templates::about::tech(viewer.user()))
}
