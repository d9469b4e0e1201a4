use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

use uspage_core::ApiResponse;
use uspage_model::{CreateThemeRequest, Theme, ThemeId, UpdateThemeRequest, User};

use crate::handlers::media::read_upload;
use crate::infra::{app_state::AppState, errors::AppResult};

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<ApiResponse<Vec<Theme>>>> {
    let themes = state.themes.list(user.id).await?;

    Ok(Json(
        ApiResponse::success(themes).with_message("Themes retrieved successfully."),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateThemeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Theme>>)> {
    let theme = state.themes.create(user.id, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(theme).with_message("Theme created successfully.")),
    ))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Theme>>> {
    let theme = state.themes.find_accessible(ThemeId::new(id), user.id).await?;

    Ok(Json(ApiResponse::success(theme)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateThemeRequest>,
) -> AppResult<Json<ApiResponse<Theme>>> {
    let theme = state
        .themes
        .update(ThemeId::new(id), request, user.id)
        .await?;

    Ok(Json(
        ApiResponse::success(theme).with_message("Theme updated successfully."),
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.themes.delete(ThemeId::new(id), user.id).await?;

    Ok(Json(ApiResponse::message("Theme deleted successfully.")))
}

/// Upload a new background image, replacing (and force-deleting) any
/// previous one.
pub async fn upload_background(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Theme>>> {
    let upload = read_upload(multipart, "bg_image_file").await?;
    let theme = state
        .themes
        .set_background_upload(ThemeId::new(id), user.id, upload)
        .await?;

    Ok(Json(
        ApiResponse::success(theme)
            .with_message("Theme background updated successfully."),
    ))
}
