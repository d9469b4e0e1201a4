//! Repository ports, one per aggregate.

pub mod invitations;
pub mod landings;
pub mod media;
pub mod themes;
pub mod users;

pub use invitations::{InvitationChanges, InvitationsRepository, NewInvitation};
pub use landings::{LandingChanges, LandingsRepository, NewLanding};
pub use media::{MediaRepository, NewMedia};
pub use themes::{NewTheme, ThemeChanges, ThemesRepository};
pub use users::{NewUser, UsersRepository};
