use async_trait::async_trait;

use crate::error::Result;
use uspage_model::{MediaId, Theme, ThemeId, UserId};

/// Insert payload for a user theme.
#[derive(Debug, Clone)]
pub struct NewTheme {
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub bg_color: String,
    pub css_class: String,
    pub bg_image: Option<(MediaId, String)>,
}

/// Scalar field updates; `None` leaves a column untouched. The background
/// image is patched through [`ThemesRepository::update_background`]
/// because clearing it must be expressible.
#[derive(Debug, Clone, Default)]
pub struct ThemeChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub bg_color: Option<String>,
    pub css_class: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ThemesRepository: Send + Sync {
    /// System themes plus the user's own, ordered by name.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Theme>>;

    async fn find_by_id(&self, id: ThemeId) -> Result<Option<Theme>>;

    async fn create(&self, theme: NewTheme) -> Result<Theme>;

    async fn update(&self, id: ThemeId, changes: ThemeChanges) -> Result<Theme>;

    /// Set or clear `(bg_image_media_id, bg_image_url)` in one statement.
    async fn update_background(
        &self,
        id: ThemeId,
        background: Option<(MediaId, String)>,
    ) -> Result<Theme>;

    /// Delete the row; a restrict-FK violation from landings surfaces as
    /// `Validation`.
    async fn delete(&self, id: ThemeId) -> Result<()>;
}
