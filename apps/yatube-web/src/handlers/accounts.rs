//! Signup, login/logout and password change.

use actix_web::{HttpResponse, http::header, web};

use yatube_core::forms::{BoundForm, FormErrors};
use yatube_core::services::{Session, Submission};
use yatube_shared::dto::{LoginFormData, NextQuery, PasswordChangeFormData, SignupFormData};

use super::{html, redirect};
use crate::middleware::auth::{CurrentUser, MaybeUser, removal_cookie, safe_next, session_cookie};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::templates;

/// Redirect to `location` carrying the new session cookie.
fn signed_in(state: &AppState, session: Session, location: &str) -> HttpResponse {
    let cookie = session_cookie(
        session.token,
        state.accounts.session_lifetime(),
        state.settings.secure_cookies,
    );
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .cookie(cookie)
        .finish()
}

/// GET /auth/signup/
pub async fn signup_form(viewer: MaybeUser) -> HttpResponse {
    html(templates::users::signup(&BoundForm::unbound(), viewer.user()))
}

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    viewer: MaybeUser,
    form: web::Form<SignupFormData>,
) -> AppResult<HttpResponse> {
    match state.accounts.signup(form.into_inner()).await? {
        Submission::Accepted(session) => Ok(signed_in(&state, session, "/")),
        Submission::Rejected(form) => Ok(html(templates::users::signup(&form, viewer.user()))),
    }
}

/// GET /auth/login/
pub async fn login_form(viewer: MaybeUser, query: web::Query<NextQuery>) -> HttpResponse {
    let data = LoginFormData {
        next: safe_next(query.next.as_deref()).map(str::to_string),
        ..LoginFormData::default()
    };
    html(templates::users::login(
        &BoundForm::new(data, FormErrors::new()),
        viewer.user(),
    ))
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    viewer: MaybeUser,
    form: web::Form<LoginFormData>,
) -> AppResult<HttpResponse> {
    let mut data = form.into_inner();
    data.next = safe_next(data.next.as_deref()).map(str::to_string);
    let next = data.next.clone();

    match state.accounts.login(data).await? {
        Submission::Accepted(session) => {
            Ok(signed_in(&state, session, next.as_deref().unwrap_or("/")))
        }
        Submission::Rejected(form) => Ok(html(templates::users::login(&form, viewer.user()))),
    }
}

/// POST /auth/logout/
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(header::ContentType::html())
        .cookie(removal_cookie())
        .body(templates::users::logged_out())
}

/// GET /auth/password_change/
pub async fn password_change_form(CurrentUser(user): CurrentUser) -> HttpResponse {
    html(templates::users::password_change(
        &BoundForm::unbound(),
        Some(&user),
    ))
}

/// POST /auth/password_change/
pub async fn password_change(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    form: web::Form<PasswordChangeFormData>,
) -> AppResult<HttpResponse> {
    match state
        .accounts
        .change_password(&user, form.into_inner())
        .await?
    {
        Submission::Accepted(()) => Ok(redirect("/auth/password_change/done/")),
        Submission::Rejected(form) => {
            Ok(html(templates::users::password_change(&form, Some(&user))))
        }
    }
}

/// GET /auth/password_change/done/
pub async fn password_change_done(CurrentUser(user): CurrentUser) -> HttpResponse {
    html(templates::users::password_change_done(Some(&user)))
}
