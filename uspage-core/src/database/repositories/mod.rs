//! Postgres implementations of the repository ports.

pub mod invitations;
pub mod landings;
pub mod media;
pub mod themes;
pub mod users;

pub use invitations::PostgresInvitationsRepository;
pub use landings::PostgresLandingsRepository;
pub use media::PostgresMediaRepository;
pub use themes::PostgresThemesRepository;
pub use users::PostgresUsersRepository;
