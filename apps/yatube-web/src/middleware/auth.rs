//! Session cookie and the user extractors built on it.

use std::time::Duration;

use actix_web::cookie::{Cookie, SameSite, time};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest, web};
use futures::future::LocalBoxFuture;

use yatube_core::domain::User;

use crate::middleware::error::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "sessionid";

/// The user a request was authenticated as, cached in request extensions
/// so the session is resolved once per request.
#[derive(Debug, Clone)]
pub struct ResolvedUser(pub User);

/// The signed-in user, if any. Never fails for anonymous requests.
///
/// ```ignore
/// async fn index(viewer: MaybeUser) -> impl Responder { ... }
/// ```
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

/// The signed-in user. Anonymous requests are redirected to the login page
/// with `next` pointing back at the original URL.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

async fn resolve(req: &HttpRequest) -> Result<Option<User>, AppError> {
    if let Some(resolved) = req.extensions().get::<ResolvedUser>() {
        return Ok(Some(resolved.0.clone()));
    }

    let Some(cookie) = req.cookie(SESSION_COOKIE) else {
        return Ok(None);
    };

    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        tracing::error!("AppState not found in app data");
        AppError::Internal("Server configuration error".to_string())
    })?;

    let user = state.accounts.authenticate(cookie.value()).await?;
    if let Some(user) = &user {
        req.extensions_mut().insert(ResolvedUser(user.clone()));
    }
    Ok(user)
}

impl FromRequest for MaybeUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { resolve(&req).await.map(MaybeUser) })
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            match resolve(&req).await? {
                Some(user) => Ok(CurrentUser(user)),
                None => {
                    let next = req
                        .uri()
                        .path_and_query()
                        .map(|pq| pq.as_str().to_string())
                        .unwrap_or_else(|| req.path().to_string());
                    Err(AppError::LoginRequired { next })
                }
            }
        })
    }
}

/// The cookie that carries a freshly issued session token.
pub fn session_cookie(token: String, lifetime: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(lifetime.as_secs() as i64))
        .finish()
}

/// A cookie that tells the browser to drop the session.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// Only same-site absolute paths are valid redirect targets after login.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}
