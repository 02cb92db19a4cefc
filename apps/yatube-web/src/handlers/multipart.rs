//! Reading the post form out of a `multipart/form-data` body.

use actix_multipart::{Field, Multipart};
use futures::TryStreamExt;

use yatube_core::ports::Upload;
use yatube_shared::dto::{PostFormData, UnreadableField};

use crate::middleware::error::AppError;

/// Longest accepted text field. Longer values are rejected as a field error.
pub const MAX_TEXT_FIELD_BYTES: usize = 1024 * 1024;

/// The "clear image" checkbox only ever carries a short marker.
const CHECKBOX_BYTES: usize = 16;

/// Collect `text`, `group`, `image-clear` and the `image` upload. The image
/// is read up to one byte past `max_image_bytes` so oversize files can be
/// reported by validation without buffering them whole.
pub async fn read_post_form(
    mut payload: Multipart,
    max_image_bytes: usize,
) -> Result<(PostFormData, Option<Upload>), AppError> {
    let mut data = PostFormData::default();
    let mut image = None;

    while let Some(mut field) = payload.try_next().await.map_err(bad_multipart)? {
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        match name.as_str() {
            "text" | "group" => {
                let value = match read_text(&mut field).await? {
                    Ok(value) => value,
                    Err(problem) => {
                        tracing::debug!(field = %name, ?problem, "Unreadable form field");
                        data.unreadable.push((name.clone(), problem));
                        String::new()
                    }
                };
                if name == "text" {
                    data.text = value;
                } else {
                    data.group = value;
                }
            }
            "image-clear" => {
                let raw = read_limited(&mut field, CHECKBOX_BYTES).await?;
                let value = String::from_utf8_lossy(&raw);
                data.clear_image = !value.is_empty() && value != "off" && value != "false";
            }
            "image" => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or_default()
                    .to_string();
                let content_type = field.content_type().map(|m| m.to_string());
                let bytes = read_limited(&mut field, max_image_bytes.saturating_add(1)).await?;

                // An untouched file input still submits an empty part.
                if !(filename.is_empty() && bytes.is_empty()) {
                    image = Some(Upload {
                        filename,
                        content_type,
                        data: bytes,
                    });
                }
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown form field");
                read_limited(&mut field, 0).await?;
            }
        }
    }

    Ok((data, image))
}

/// The field as UTF-8 text, or why it cannot be used. Never a truncated
/// prefix: one byte past the limit is kept only to detect overflow.
async fn read_text(field: &mut Field) -> Result<Result<String, UnreadableField>, AppError> {
    let bytes = read_limited(field, MAX_TEXT_FIELD_BYTES + 1).await?;
    if bytes.len() > MAX_TEXT_FIELD_BYTES {
        return Ok(Err(UnreadableField::TooLong {
            limit: MAX_TEXT_FIELD_BYTES,
        }));
    }
    Ok(String::from_utf8(bytes).map_err(|_| UnreadableField::NotUtf8))
}

/// Drain the field, keeping at most `limit` bytes.
async fn read_limited(field: &mut Field, limit: usize) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
        let room = limit.saturating_sub(buf.len());
        buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }
    Ok(buf)
}

fn bad_multipart(err: actix_multipart::MultipartError) -> AppError {
    tracing::warn!(error = %err, "Malformed multipart body");
    AppError::BadRequest(err.to_string())
}
