//! Bearer-token authentication middleware.
//!
//! `auth_middleware` rejects anonymous requests; `optional_auth_middleware`
//! attaches the user when a valid token is present and stays silent
//! otherwise, for routes that serve both owners and the public.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use uspage_model::User;

use crate::infra::app_state::AppState;
use crate::infra::errors::AppError;

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&request)
        .ok_or_else(|| AppError::unauthorized("Unauthenticated"))?;
    let user = state.auth.authenticate_token(&token).await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_bearer_token(&request)
        && let Ok(user) = state.auth.authenticate_token(&token).await
    {
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

/// The current user, if `optional_auth_middleware` attached one.
///
/// Handlers on optional-auth routes take this and call [`require_user`]
/// on the paths that still demand an authenticated caller.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<User>().cloned()))
    }
}

/// Unwrap [`MaybeUser`], failing with 401.
pub fn require_user(user: MaybeUser) -> Result<User, AppError> {
    user.0
        .ok_or_else(|| AppError::unauthorized("Unauthenticated"))
}

fn extract_bearer_token(request: &Request) -> Option<String> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?;

    auth_header
        .strip_prefix("Bearer ")
        .map(|token| token.to_string())
}
