use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use uspage_core::ApiResponse;
use uspage_model::{
    AttachLandingMediaRequest, CreateLandingRequest, Landing, LandingId, Media,
    MediaId, ReorderMediaRequest, UpdateLandingRequest, User,
};

use crate::infra::{
    app_state::AppState,
    errors::AppResult,
    middleware::{MaybeUser, require_user},
};

/// Landing plus its ordered gallery, as returned by the read endpoints.
#[derive(Debug, Serialize)]
pub struct LandingData {
    #[serde(flatten)]
    pub landing: Landing,
    pub media: Vec<Media>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<ApiResponse<Vec<Landing>>>> {
    let landings = state.landings.list_for_user(user.id).await?;

    Ok(Json(
        ApiResponse::success(landings)
            .with_message("Landings retrieved successfully."),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateLandingRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<LandingData>>)> {
    let landing = state.landings.create(user.id, request).await?;
    let media = state.landings.media(landing.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(LandingData { landing, media })
                .with_message("Landing created successfully."),
        ),
    ))
}

/// Read path shared by owners and the public.
///
/// A numeric identifier is the authenticated-owner path (401 anonymous,
/// 403 non-owner); anything else is treated as a slug and only published,
/// live landings come back — absent and private are both 404 here.
pub async fn show(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(identifier): Path<String>,
) -> AppResult<Json<ApiResponse<LandingData>>> {
    let landing = match identifier.parse::<i64>() {
        Ok(id) => {
            let user = require_user(user)?;
            state
                .landings
                .find_for_user(LandingId::new(id), user.id)
                .await?
        }
        Err(_) => state.landings.find_public_by_slug(&identifier).await?,
    };

    let media = state.landings.media(landing.id).await?;
    Ok(Json(ApiResponse::success(LandingData { landing, media })))
}

/// Anonymous read, slug only.
pub async fn show_public(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<LandingData>>> {
    let landing = state.landings.find_public_by_slug(&slug).await?;
    let media = state.landings.media(landing.id).await?;

    Ok(Json(ApiResponse::success(LandingData { landing, media })))
}

pub async fn update(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateLandingRequest>,
) -> AppResult<Json<ApiResponse<LandingData>>> {
    let user = require_user(user)?;
    let landing = state
        .landings
        .update(LandingId::new(id), request, user.id)
        .await?;
    let media = state.landings.media(landing.id).await?;

    Ok(Json(
        ApiResponse::success(LandingData { landing, media })
            .with_message("Landing updated successfully."),
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    let user = require_user(user)?;
    state.landings.delete(LandingId::new(id), user.id).await?;

    Ok(Json(ApiResponse::message("Landing deleted successfully.")))
}

pub async fn attach_media(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    Json(request): Json<AttachLandingMediaRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<()>>)> {
    state
        .landings
        .attach_media(
            LandingId::new(id),
            request.media_id,
            user.id,
            request.sort_order,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::message(
            "Media attached to the landing successfully.",
        )),
    ))
}

pub async fn detach_media(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((id, media_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .landings
        .detach_media(LandingId::new(id), MediaId::new(media_id), user.id)
        .await?;

    Ok(Json(ApiResponse::message(
        "Media detached from the landing successfully.",
    )))
}

pub async fn reorder_media(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    Json(request): Json<ReorderMediaRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .landings
        .reorder_media(LandingId::new(id), &request.orders, user.id)
        .await?;

    Ok(Json(ApiResponse::message("Media reordered successfully.")))
}
