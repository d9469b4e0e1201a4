use axum::{
    Json, Router, middleware,
    routing::{get, post, put},
};
use chrono::Utc;

use crate::handlers::{auth, invitations, landings, media, themes};
use crate::infra::app_state::AppState;
use crate::infra::middleware::{auth_middleware, optional_auth_middleware};

/// Create all API routes, mounted under `/api`.
pub fn create_api_router(state: AppState) -> Router<AppState> {
    Router::new()
        // Liveness
        .route("/ping", get(ping_handler))
        // Public authentication endpoints
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Public slug-only reads
        .route("/public/landing/{slug}", get(landings::show_public))
        .route("/public/invitation/{slug}", get(invitations::show_public))
        // Reads shared by owners (numeric id) and the public (slug)
        .merge(create_entity_routes(state.clone()))
        // Everything else requires a bearer token
        .merge(create_protected_routes(state))
}

/// Routes on the id-or-slug identifier.
///
/// Auth is optional at the route level: the handlers demand a user for
/// writes and for numeric-id reads, while slug reads stay anonymous.
fn create_entity_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/landings/{id}",
            get(landings::show)
                .put(landings::update)
                .delete(landings::delete),
        )
        .route(
            "/invitations/{id}",
            get(invitations::show)
                .put(invitations::update)
                .delete(invitations::delete),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            optional_auth_middleware,
        ))
}

/// Routes that require authentication.
fn create_protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Auth endpoints
        .route("/auth/logout", post(auth::logout))
        .route("/auth/user", get(auth::current_user))
        .route("/tokens/create", post(auth::create_web_token))
        // Themes
        .route("/themes", get(themes::list).post(themes::create))
        .route(
            "/themes/{id}",
            get(themes::show).put(themes::update).delete(themes::delete),
        )
        .route("/themes/{id}/background", post(themes::upload_background))
        // Media
        .route("/media", get(media::list).post(media::upload))
        .route("/media/{id}", axum::routing::delete(media::delete))
        // Landings
        .route("/landings", get(landings::list).post(landings::create))
        .route("/landings/{id}/media", post(landings::attach_media))
        .route(
            "/landings/{id}/media/reorder",
            put(landings::reorder_media),
        )
        .route(
            "/landings/{id}/media/{media_id}",
            axum::routing::delete(landings::detach_media),
        )
        // Invitations
        .route(
            "/invitations",
            get(invitations::list).post(invitations::create),
        )
        .route("/invitations/{id}/media", post(invitations::attach_media))
        .route(
            "/invitations/{id}/media/{media_id}",
            axum::routing::delete(invitations::detach_media),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn ping_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "OK",
        "timestamp": Utc::now(),
        "message": "pong",
    }))
}
