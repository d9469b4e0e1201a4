use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

use uspage_core::ApiResponse;
use uspage_model::{Media, MediaId, MediaUpload, User};

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<ApiResponse<Vec<Media>>>> {
    let media = state.media.list_for_user(user.id).await?;

    Ok(Json(
        ApiResponse::success(media).with_message("Media retrieved successfully."),
    ))
}

pub async fn upload(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Media>>)> {
    let upload = read_upload(multipart, "file").await?;
    let media = state.media.upload(user.id, upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(media).with_message("File uploaded successfully.")),
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    let deleted = state.media.delete(MediaId::new(id), user.id).await?;

    if !deleted {
        return Err(AppError::unprocessable(
            "The file cannot be deleted. It may not exist, not belong to you, \
             or still be in use.",
        ));
    }

    Ok(Json(ApiResponse::message("File deleted successfully.")))
}

/// Pull the named file field out of a multipart body.
pub(crate) async fn read_upload(
    mut multipart: Multipart,
    field_name: &str,
) -> Result<MediaUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(field_name) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let mime_type = match field.content_type() {
            Some(mime) => mime.to_string(),
            None => guess_mime_type(&filename),
        };
        let bytes = field.bytes().await.map_err(|e| {
            AppError::bad_request(format!("Failed to read upload: {e}"))
        })?;

        return Ok(MediaUpload {
            filename,
            mime_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::unprocessable(format!(
        "The {field_name} field is required"
    )))
}

fn guess_mime_type(filename: &str) -> String {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_mime_from_extension() {
        assert_eq!(guess_mime_type("photo.JPG"), "image/jpeg");
        assert_eq!(guess_mime_type("anim.gif"), "image/gif");
        assert_eq!(guess_mime_type("no-extension"), "application/octet-stream");
    }
}
