//! HTTP handlers and route configuration.

mod about;
mod accounts;
mod follows;
mod health;
mod media;
mod multipart;
mod posts;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use actix_web::http::header::{self, ContentType};
use actix_web::{HttpResponse, web};

use yatube_core::ports::RateLimiter;

use crate::middleware::auth::MaybeUser;
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes. `auth_limiter` throttles login and
/// signup submissions.
pub fn configure_routes(cfg: &mut web::ServiceConfig, auth_limiter: Arc<dyn RateLimiter>) {
    cfg.route("/", web::get().to(posts::index))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .route("/profile/{username}/follow/", web::post().to(follows::profile_follow))
        .route("/profile/{username}/unfollow/", web::post().to(follows::profile_unfollow))
        .route("/follow/", web::get().to(follows::follow_index))
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::post_create_form))
                .route(web::post().to(posts::post_create)),
        )
        .route("/posts/{id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/posts/{id}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .route("/posts/{id}/comment/", web::post().to(posts::add_comment))
        .route("/posts/{id}/delete/", web::post().to(posts::post_delete))
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/signup/")
                        .wrap(RateLimitMiddleware::new(auth_limiter.clone()))
                        .route(web::get().to(accounts::signup_form))
                        .route(web::post().to(accounts::signup)),
                )
                .service(
                    web::resource("/login/")
                        .wrap(RateLimitMiddleware::new(auth_limiter))
                        .route(web::get().to(accounts::login_form))
                        .route(web::post().to(accounts::login)),
                )
                .route("/logout/", web::post().to(accounts::logout))
                .service(
                    web::resource("/password_change/")
                        .route(web::get().to(accounts::password_change_form))
                        .route(web::post().to(accounts::password_change)),
                )
                .route(
                    "/password_change/done/",
                    web::get().to(accounts::password_change_done),
                ),
        )
        .route("/about/author/", web::get().to(about::author))
        .route("/about/tech/", web::get().to(about::tech))
        .route("/media/{path:.*}", web::get().to(media::serve))
        .route("/health", web::get().to(health::health_check));
}

/// Fallback for unrouted paths. Resolving the viewer first lets the 404 page
/// show the signed-in navigation.
pub async fn not_found(req: actix_web::HttpRequest, _viewer: MaybeUser) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(format!("No route for {}", req.path())))
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

fn redirect(location: impl Into<String>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}

fn profile_url(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

fn post_url(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}
