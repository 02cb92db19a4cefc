//! Application errors and the HTML error pages they end up as.

use actix_web::body::EitherBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::{HttpMessage, HttpResponse, ResponseError};

use yatube_core::error::{DomainError, RepoError};

use crate::middleware::auth::ResolvedUser;
use crate::templates;

/// Application-level error type returned by handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Anonymous access to a page that needs a user; answered with a
    /// redirect to the login page.
    #[error("Login required for {next}")]
    LoginRequired { next: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::LoginRequired { .. } => StatusCode::FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::LoginRequired { next } => HttpResponse::Found()
                .insert_header((header::LOCATION, login_url(next)))
                .finish(),
            AppError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal error");
                HttpResponse::InternalServerError().finish()
            }
            // The page body is filled in by `error_pages`.
            other => HttpResponse::build(other.status_code()).finish(),
        }
    }
}

pub fn login_url(next: &str) -> String {
    format!("/auth/login/?next={}", urlencoding::encode(next))
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, key } => {
                AppError::NotFound(format!("{} {} not found", entity_type, key))
            }
            DomainError::Validation(msg) | DomainError::Duplicate(msg) => AppError::BadRequest(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        DomainError::from(err).into()
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Replace bare 404 and 500 responses, whoever produced them, with the
/// site's error pages.
pub fn error_pages<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new()
        .handler(StatusCode::NOT_FOUND, render_not_found)
        .handler(StatusCode::INTERNAL_SERVER_ERROR, render_server_error)
}

fn render_not_found<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let viewer = res.request().extensions().get::<ResolvedUser>().cloned();
    let page = templates::errors::page_not_found(res.request().path(), viewer.as_ref().map(|v| &v.0));
    Ok(html_page(res, StatusCode::NOT_FOUND, page))
}

fn render_server_error<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    Ok(html_page(
        res,
        StatusCode::INTERNAL_SERVER_ERROR,
        templates::errors::server_error(),
    ))
}

fn html_page<B>(res: ServiceResponse<B>, status: StatusCode, page: String) -> ErrorHandlerResponse<B> {
    let (req, _) = res.into_parts();
    let response = HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(page);

    let res: ServiceResponse<EitherBody<B>> =
        ServiceResponse::new(req, response).map_into_right_body();
    ErrorHandlerResponse::Response(res)
}
