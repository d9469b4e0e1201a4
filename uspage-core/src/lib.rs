//! # UsPage Core
//!
//! The engine behind the UsPage HTTP server: every ownership, uniqueness
//! and limit invariant lives here, framed by three layers.
//!
//! - [`database`] — repository ports (traits) and their Postgres
//!   implementations. Repositories build queries; they enforce nothing
//!   beyond the schema's own constraints.
//! - [`storage`] — the blob-storage port and the local-disk backend.
//! - [`services`] — `AuthService`, `ThemeService`, `LandingService`,
//!   `InvitationService`, `MediaService`. All invariants are owned here:
//!   ownership checks, per-user slug uniqueness, media attachment limits,
//!   the in-use delete guard, and the theme background cascade.
//!
//! Concurrency model: stateless request-per-call. The services hold no
//! locks; racing writers are resolved by the database's unique and
//! foreign-key constraints, whose violations surface as typed errors.

pub mod api;
pub mod database;
pub mod error;
pub mod services;
pub mod storage;

pub use api::ApiResponse;
pub use error::{CoreError, Result};
