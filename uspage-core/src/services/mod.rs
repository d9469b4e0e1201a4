//! Domain services.
//!
//! Every invariant of the system lives in this layer: ownership checks,
//! per-user slug uniqueness, attachment limits, the media in-use guard,
//! and the theme background cascade. Repositories below enforce nothing
//! but schema constraints; handlers above only translate errors.

pub mod auth;
pub mod invitation;
pub mod landing;
pub mod media;
pub mod theme;

pub use auth::AuthService;
pub use invitation::InvitationService;
pub use landing::LandingService;
pub use media::MediaService;
pub use theme::ThemeService;
