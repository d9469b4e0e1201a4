//! Domain model for UsPage.
//!
//! Plain data types shared by the core services and the HTTP server:
//! entities (users, themes, landings, invitations, media), strongly typed
//! ids, request payloads with their validation rules, and the slug
//! derivation routine. This crate performs no I/O.

pub mod error;
pub mod ids;
pub mod invitation;
pub mod landing;
pub mod media;
pub mod slug;
pub mod theme;
pub mod user;

pub use error::ValidationError;
pub use ids::{InvitationId, LandingId, MediaId, ThemeId, UserId};
pub use invitation::{
    AttachInvitationMediaRequest, CreateInvitationRequest, Invitation,
    UpdateInvitationRequest,
};
pub use landing::{
    AttachLandingMediaRequest, CreateLandingRequest, Landing, MediaOrder,
    ReorderMediaRequest, UpdateLandingRequest,
};
pub use media::{Media, MediaReference, MediaUpload};
pub use slug::{is_valid_slug, slugify};
pub use theme::{CreateThemeRequest, Theme, UpdateThemeRequest};
pub use user::{AuthToken, LoginRequest, RegisterRequest, User};
