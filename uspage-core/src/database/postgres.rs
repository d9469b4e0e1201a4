use std::fmt;
use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::database::ports::{
    InvitationsRepository, LandingsRepository, MediaRepository,
    ThemesRepository, UsersRepository,
};
use crate::database::repositories::{
    PostgresInvitationsRepository, PostgresLandingsRepository,
    PostgresMediaRepository, PostgresThemesRepository, PostgresUsersRepository,
};
use crate::error::{CoreError, Result};

/// Connection pool plus one repository per aggregate.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    users: Arc<PostgresUsersRepository>,
    themes: Arc<PostgresThemesRepository>,
    landings: Arc<PostgresLandingsRepository>,
    invitations: Arc<PostgresInvitationsRepository>,
    media: Arc<PostgresMediaRepository>,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish()
    }
}

impl Database {
    pub async fn connect(connection_string: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .test_before_acquire(true)
            .connect(connection_string)
            .await
            .map_err(|e| {
                CoreError::Database(format!("Database connection failed: {e}"))
            })?;

        info!(max_connections, "database pool initialized");

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        let users = Arc::new(PostgresUsersRepository::new(pool.clone()));
        let themes = Arc::new(PostgresThemesRepository::new(pool.clone()));
        let landings = Arc::new(PostgresLandingsRepository::new(pool.clone()));
        let invitations = Arc::new(PostgresInvitationsRepository::new(pool.clone()));
        let media = Arc::new(PostgresMediaRepository::new(pool.clone()));

        Self {
            pool,
            users,
            themes,
            landings,
            invitations,
            media,
        }
    }

    /// Apply pending migrations from the workspace `migrations/` directory.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| CoreError::Database(format!("Migration failed: {e}")))?;
        info!("database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn users(&self) -> Arc<dyn UsersRepository> {
        self.users.clone()
    }

    pub fn themes(&self) -> Arc<dyn ThemesRepository> {
        self.themes.clone()
    }

    pub fn landings(&self) -> Arc<dyn LandingsRepository> {
        self.landings.clone()
    }

    pub fn invitations(&self) -> Arc<dyn InvitationsRepository> {
        self.invitations.clone()
    }

    pub fn media(&self) -> Arc<dyn MediaRepository> {
        self.media.clone()
    }
}
