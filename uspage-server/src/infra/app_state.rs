use std::fmt;
use std::sync::Arc;

use uspage_core::database::Database;
use uspage_core::services::{
    AuthService, InvitationService, LandingService, MediaService, ThemeService,
};
use uspage_core::storage::StorageBackend;

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub storage: Arc<dyn StorageBackend>,
    pub auth: Arc<AuthService>,
    pub themes: Arc<ThemeService>,
    pub landings: Arc<LandingService>,
    pub invitations: Arc<InvitationService>,
    pub media: Arc<MediaService>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(config: Config, db: Database, storage: Arc<dyn StorageBackend>) -> Self {
        let media = Arc::new(MediaService::new(db.media(), storage.clone()));
        let auth = Arc::new(AuthService::new(db.users()));
        let themes = Arc::new(ThemeService::new(db.themes(), media.clone()));
        let landings = Arc::new(LandingService::new(
            db.landings(),
            db.themes(),
            media.clone(),
        ));
        let invitations =
            Arc::new(InvitationService::new(db.invitations(), media.clone()));

        Self {
            config: Arc::new(config),
            db,
            storage,
            auth,
            themes,
            landings,
            invitations,
            media,
        }
    }
}
