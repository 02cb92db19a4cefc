//! Uploaded files.

use actix_web::{HttpResponse, http::header, web};

use yatube_core::ports::MediaError;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /media/{path}
pub async fn serve(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let data = state.media.open(&path).await.map_err(|e| match e {
        MediaError::NotFound(_) | MediaError::InvalidPath(_) => {
            AppError::NotFound(format!("Media {} not found", path.as_str()))
        }
        MediaError::Io(detail) => AppError::Internal(detail),
    })?;

    let mime = mime_guess::from_path(path.as_str()).first_or_octet_stream();
    Ok(HttpResponse::Ok()
        .content_type(mime.as_ref())
        .insert_header((header::CACHE_CONTROL, "public, max-age=3600"))
        .body(data))
}
