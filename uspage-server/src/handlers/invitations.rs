use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use uspage_core::ApiResponse;
use uspage_model::{
    AttachInvitationMediaRequest, CreateInvitationRequest, Invitation,
    InvitationId, Media, MediaId, UpdateInvitationRequest, User,
};

use crate::infra::{
    app_state::AppState,
    errors::AppResult,
    middleware::{MaybeUser, require_user},
};

/// Invitation plus its linked media, as returned by the read endpoints.
#[derive(Debug, Serialize)]
pub struct InvitationData {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub media: Vec<Media>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<ApiResponse<Vec<Invitation>>>> {
    let invitations = state.invitations.list_for_user(user.id).await?;

    Ok(Json(
        ApiResponse::success(invitations)
            .with_message("Invitations retrieved successfully."),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateInvitationRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<InvitationData>>)> {
    let invitation = state.invitations.create(user.id, request).await?;
    let media = state.invitations.media(invitation.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(InvitationData { invitation, media })
                .with_message("Invitation created successfully."),
        ),
    ))
}

/// Read path shared by owners and the public; see the landing twin for
/// the disambiguation rules.
pub async fn show(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(identifier): Path<String>,
) -> AppResult<Json<ApiResponse<InvitationData>>> {
    let invitation = match identifier.parse::<i64>() {
        Ok(id) => {
            let user = require_user(user)?;
            state
                .invitations
                .find_for_user(InvitationId::new(id), user.id)
                .await?
        }
        Err(_) => state.invitations.find_public_by_slug(&identifier).await?,
    };

    let media = state.invitations.media(invitation.id).await?;
    Ok(Json(ApiResponse::success(InvitationData { invitation, media })))
}

/// Anonymous read, slug only.
pub async fn show_public(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<InvitationData>>> {
    let invitation = state.invitations.find_public_by_slug(&slug).await?;
    let media = state.invitations.media(invitation.id).await?;

    Ok(Json(ApiResponse::success(InvitationData { invitation, media })))
}

pub async fn update(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateInvitationRequest>,
) -> AppResult<Json<ApiResponse<InvitationData>>> {
    let user = require_user(user)?;
    let invitation = state
        .invitations
        .update(InvitationId::new(id), request, user.id)
        .await?;
    let media = state.invitations.media(invitation.id).await?;

    Ok(Json(
        ApiResponse::success(InvitationData { invitation, media })
            .with_message("Invitation updated successfully."),
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    let user = require_user(user)?;
    state
        .invitations
        .delete(InvitationId::new(id), user.id)
        .await?;

    Ok(Json(ApiResponse::message("Invitation deleted successfully.")))
}

pub async fn attach_media(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    Json(request): Json<AttachInvitationMediaRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<()>>)> {
    state
        .invitations
        .attach_media(InvitationId::new(id), request.media_id, user.id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::message(
            "Media attached to the invitation successfully.",
        )),
    ))
}

pub async fn detach_media(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((id, media_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .invitations
        .detach_media(InvitationId::new(id), MediaId::new(media_id), user.id)
        .await?;

    Ok(Json(ApiResponse::message(
        "Media detached from the invitation successfully.",
    )))
}
