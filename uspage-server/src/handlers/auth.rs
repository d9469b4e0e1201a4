use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Serialize;

use uspage_core::ApiResponse;
use uspage_core::services::auth::WEB_TOKEN;
use uspage_model::{AuthToken, LoginRequest, RegisterRequest, User};

use crate::infra::{app_state::AppState, errors::AppResult};

/// User plus freshly issued credential, returned by login and register.
#[derive(Debug, Serialize)]
pub struct SessionData {
    pub user: User,
    pub token: String,
    pub token_type: String,
}

impl SessionData {
    fn new(user: User, token: AuthToken) -> Self {
        Self {
            user,
            token: token.token,
            token_type: token.token_type,
        }
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SessionData>>)> {
    let (user, token) = state.auth.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(SessionData::new(user, token))
                .with_message("User registered successfully."),
        ),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<SessionData>>> {
    let (user, token) = state.auth.login(request).await?;

    Ok(Json(
        ApiResponse::success(SessionData::new(user, token))
            .with_message("Login successful."),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.auth.logout(user.id).await?;

    Ok(Json(ApiResponse::message("Logged out successfully.")))
}

pub async fn current_user(
    Extension(user): Extension<User>,
) -> Json<ApiResponse<User>> {
    Json(ApiResponse::success(user))
}

/// Issue a `web_token` credential, replacing any previous one of that
/// kind so repeated calls never accumulate tokens.
pub async fn create_web_token(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<ApiResponse<SessionData>>> {
    let token = state.auth.issue_token(user.id, WEB_TOKEN).await?;

    Ok(Json(ApiResponse::success(SessionData::new(user, token))))
}
