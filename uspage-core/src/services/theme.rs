//! Theme lifecycle, including the background-image state machine.
//!
//! A theme's background media is owned by the theme: replacing or
//! clearing it force-deletes the old media, and deleting the theme takes
//! the media with it. System themes (no owner) are immutable.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::database::ports::themes::{NewTheme, ThemeChanges, ThemesRepository};
use crate::error::{CoreError, Result};
use crate::services::media::MediaService;
use uspage_model::{
    CreateThemeRequest, MediaUpload, Theme, ThemeId, UpdateThemeRequest, UserId,
};

pub struct ThemeService {
    themes: Arc<dyn ThemesRepository>,
    media: Arc<MediaService>,
}

impl fmt::Debug for ThemeService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeService").finish_non_exhaustive()
    }
}

impl ThemeService {
    pub fn new(themes: Arc<dyn ThemesRepository>, media: Arc<MediaService>) -> Self {
        Self { themes, media }
    }

    /// System themes plus the user's own.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Theme>> {
        self.themes.list_for_user(user_id).await
    }

    /// A theme the user may read: system or their own.
    pub async fn find_accessible(&self, id: ThemeId, user_id: UserId) -> Result<Theme> {
        let theme = self.themes.find_by_id(id).await?.ok_or(CoreError::NotFound)?;
        if theme.is_system() || theme.user_id == Some(user_id) {
            Ok(theme)
        } else {
            Err(CoreError::NotFound)
        }
    }

    pub async fn create(
        &self,
        user_id: UserId,
        request: CreateThemeRequest,
    ) -> Result<Theme> {
        request.validate()?;

        let bg_image = match request.bg_image_media_id {
            Some(media_id) => {
                let media = self.media.find_owned(media_id, user_id).await?;
                Some((media.id, media.url))
            }
            None => None,
        };

        self.themes
            .create(NewTheme {
                user_id,
                name: request.name,
                description: request.description,
                primary_color: request.primary_color,
                secondary_color: request.secondary_color,
                bg_color: request.bg_color,
                css_class: request.css_class,
                bg_image,
            })
            .await
    }

    /// Update scalar fields and apply the background patch.
    ///
    /// The background field is tri-state: absent leaves it untouched,
    /// `null` clears it (force-deleting the old media), and an id
    /// replaces it (force-deleting the old media when different).
    pub async fn update(
        &self,
        id: ThemeId,
        request: UpdateThemeRequest,
        user_id: UserId,
    ) -> Result<Theme> {
        let theme = self.themes.find_by_id(id).await?.ok_or(CoreError::NotFound)?;
        if !can_modify(user_id, &theme) {
            return Err(CoreError::Forbidden);
        }
        request.validate()?;

        let mut updated = self
            .themes
            .update(
                id,
                ThemeChanges {
                    name: request.name,
                    description: request.description,
                    primary_color: request.primary_color,
                    secondary_color: request.secondary_color,
                    bg_color: request.bg_color,
                    css_class: request.css_class,
                },
            )
            .await?;

        match request.bg_image_media_id {
            // Field absent: background untouched.
            None => {}
            Some(None) => {
                if let Some(old) = theme.bg_image_media_id {
                    self.media.force_delete(old).await?;
                }
                updated = self.themes.update_background(id, None).await?;
            }
            Some(Some(new_media_id)) => {
                if theme.bg_image_media_id != Some(new_media_id) {
                    let media = self.media.find_owned(new_media_id, user_id).await?;
                    if let Some(old) = theme.bg_image_media_id {
                        self.media.force_delete(old).await?;
                    }
                    updated = self
                        .themes
                        .update_background(id, Some((media.id, media.url)))
                        .await?;
                }
            }
        }

        Ok(updated)
    }

    /// Upload a new background file, replacing any previous one.
    pub async fn set_background_upload(
        &self,
        id: ThemeId,
        user_id: UserId,
        upload: MediaUpload,
    ) -> Result<Theme> {
        let theme = self.themes.find_by_id(id).await?.ok_or(CoreError::NotFound)?;
        if !can_modify(user_id, &theme) {
            return Err(CoreError::Forbidden);
        }

        if let Some(old) = theme.bg_image_media_id {
            self.media.force_delete(old).await?;
        }

        let media = self.media.upload(user_id, upload).await?;
        self.themes
            .update_background(id, Some((media.id, media.url)))
            .await
    }

    /// Delete a user theme, cascading its background media.
    ///
    /// Order: media blob+row first, theme row second. The two steps are
    /// not one transaction; the window between them is an accepted gap.
    pub async fn delete(&self, id: ThemeId, user_id: UserId) -> Result<()> {
        let theme = self.themes.find_by_id(id).await?.ok_or(CoreError::NotFound)?;
        if !can_modify(user_id, &theme) {
            return Err(CoreError::Forbidden);
        }

        if let Some(media_id) = theme.bg_image_media_id {
            self.media.force_delete(media_id).await?;
        }

        self.themes.delete(id).await?;
        info!(theme_id = %id, "deleted theme");
        Ok(())
    }
}

/// Users modify only their own themes; system themes are off limits.
fn can_modify(user_id: UserId, theme: &Theme) -> bool {
    !theme.is_system() && theme.user_id == Some(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ports::media::MockMediaRepository;
    use crate::database::ports::themes::MockThemesRepository;
    use crate::storage::MockStorageBackend;
    use chrono::Utc;
    use mockall::Sequence;
    use uspage_model::{Media, MediaId};

    fn theme(id: i64, user_id: Option<i64>, bg: Option<i64>) -> Theme {
        Theme {
            id: ThemeId::new(id),
            user_id: user_id.map(UserId::new),
            name: "Rosa".to_string(),
            description: None,
            primary_color: "#FF5733".to_string(),
            secondary_color: "#FFC300".to_string(),
            bg_color: "#F5F5F5".to_string(),
            bg_image_media_id: bg.map(MediaId::new),
            bg_image_url: bg.map(|id| format!("http://localhost/media/{id}.jpg")),
            css_class: "theme-rosa".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn media(id: i64, user_id: i64) -> Media {
        Media {
            id: MediaId::new(id),
            user_id: UserId::new(user_id),
            filename: "bg.jpg".to_string(),
            path: format!("users/{user_id}/bg-{id}.jpg"),
            url: format!("http://localhost/media/users/{user_id}/bg-{id}.jpg"),
            mime_type: "image/jpeg".to_string(),
            size: 2048,
            created_at: Utc::now(),
        }
    }

    fn media_service(
        repo: MockMediaRepository,
        storage: MockStorageBackend,
    ) -> Arc<MediaService> {
        Arc::new(MediaService::new(Arc::new(repo), Arc::new(storage)))
    }

    #[tokio::test]
    async fn system_themes_cannot_be_deleted() {
        let mut themes = MockThemesRepository::new();
        themes
            .expect_find_by_id()
            .return_once(|_| Ok(Some(theme(1, None, None))));
        themes.expect_delete().times(0);

        let service = ThemeService::new(
            Arc::new(themes),
            media_service(MockMediaRepository::new(), MockStorageBackend::new()),
        );
        let err = service
            .delete(ThemeId::new(1), UserId::new(5))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden));
    }

    #[tokio::test]
    async fn system_themes_cannot_be_updated() {
        let mut themes = MockThemesRepository::new();
        themes
            .expect_find_by_id()
            .return_once(|_| Ok(Some(theme(1, None, None))));
        themes.expect_update().times(0);

        let service = ThemeService::new(
            Arc::new(themes),
            media_service(MockMediaRepository::new(), MockStorageBackend::new()),
        );
        let err = service
            .update(ThemeId::new(1), UpdateThemeRequest::default(), UserId::new(5))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden));
    }

    #[tokio::test]
    async fn delete_cascades_background_media_before_theme_row() {
        let mut themes = MockThemesRepository::new();
        let mut media_repo = MockMediaRepository::new();
        let mut storage = MockStorageBackend::new();
        let mut seq = Sequence::new();

        themes
            .expect_find_by_id()
            .return_once(|_| Ok(Some(theme(1, Some(5), Some(40)))));
        media_repo
            .expect_find_by_id()
            .return_once(|_| Ok(Some(media(40, 5))));
        storage.expect_exists().return_once(|_| Ok(true));
        storage.expect_delete().return_once(|_| Ok(()));
        media_repo
            .expect_delete()
            .times(1)
            .in_sequence(&mut seq)
            .return_once(|_| Ok(true));
        themes
            .expect_delete()
            .times(1)
            .in_sequence(&mut seq)
            .return_once(|_| Ok(()));

        let service =
            ThemeService::new(Arc::new(themes), media_service(media_repo, storage));
        service.delete(ThemeId::new(1), UserId::new(5)).await.unwrap();
    }

    #[tokio::test]
    async fn explicit_null_clears_and_force_deletes_background() {
        let mut themes = MockThemesRepository::new();
        let mut media_repo = MockMediaRepository::new();
        let mut storage = MockStorageBackend::new();

        themes
            .expect_find_by_id()
            .return_once(|_| Ok(Some(theme(1, Some(5), Some(40)))));
        themes
            .expect_update()
            .return_once(|_, _| Ok(theme(1, Some(5), Some(40))));
        media_repo
            .expect_find_by_id()
            .return_once(|_| Ok(Some(media(40, 5))));
        storage.expect_exists().return_once(|_| Ok(true));
        storage.expect_delete().return_once(|_| Ok(()));
        media_repo.expect_delete().return_once(|_| Ok(true));
        themes
            .expect_update_background()
            .withf(|_, background| background.is_none())
            .return_once(|_, _| Ok(theme(1, Some(5), None)));

        let service =
            ThemeService::new(Arc::new(themes), media_service(media_repo, storage));
        let request = UpdateThemeRequest {
            bg_image_media_id: Some(None),
            ..Default::default()
        };
        let updated = service
            .update(ThemeId::new(1), request, UserId::new(5))
            .await
            .unwrap();
        assert!(updated.bg_image_media_id.is_none());
    }

    #[tokio::test]
    async fn absent_background_field_leaves_image_untouched() {
        let mut themes = MockThemesRepository::new();
        themes
            .expect_find_by_id()
            .return_once(|_| Ok(Some(theme(1, Some(5), Some(40)))));
        themes
            .expect_update()
            .return_once(|_, _| Ok(theme(1, Some(5), Some(40))));
        themes.expect_update_background().times(0);

        let media_repo = MockMediaRepository::new();
        let service = ThemeService::new(
            Arc::new(themes),
            media_service(media_repo, MockStorageBackend::new()),
        );

        let request = UpdateThemeRequest {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = service
            .update(ThemeId::new(1), request, UserId::new(5))
            .await
            .unwrap();
        assert_eq!(updated.bg_image_media_id, Some(MediaId::new(40)));
    }

    #[tokio::test]
    async fn replacing_background_force_deletes_the_old_media() {
        let mut themes = MockThemesRepository::new();
        let mut media_repo = MockMediaRepository::new();
        let mut storage = MockStorageBackend::new();

        themes
            .expect_find_by_id()
            .return_once(|_| Ok(Some(theme(1, Some(5), Some(40)))));
        themes
            .expect_update()
            .return_once(|_, _| Ok(theme(1, Some(5), Some(40))));
        // New media resolved first, then the old one force-deleted.
        media_repo
            .expect_find_by_id()
            .withf(|id| id.value() == 41)
            .return_once(|_| Ok(Some(media(41, 5))));
        media_repo
            .expect_find_by_id()
            .withf(|id| id.value() == 40)
            .return_once(|_| Ok(Some(media(40, 5))));
        storage.expect_exists().return_once(|_| Ok(true));
        storage.expect_delete().return_once(|_| Ok(()));
        media_repo.expect_delete().return_once(|_| Ok(true));
        themes
            .expect_update_background()
            .withf(|_, background| {
                matches!(background, Some((id, _)) if id.value() == 41)
            })
            .return_once(|_, _| Ok(theme(1, Some(5), Some(41))));

        let service =
            ThemeService::new(Arc::new(themes), media_service(media_repo, storage));
        let request = UpdateThemeRequest {
            bg_image_media_id: Some(Some(MediaId::new(41))),
            ..Default::default()
        };
        let updated = service
            .update(ThemeId::new(1), request, UserId::new(5))
            .await
            .unwrap();
        assert_eq!(updated.bg_image_media_id, Some(MediaId::new(41)));
    }

    #[tokio::test]
    async fn cross_user_background_reference_is_a_validation_failure() {
        let mut themes = MockThemesRepository::new();
        let mut media_repo = MockMediaRepository::new();

        themes
            .expect_find_by_id()
            .return_once(|_| Ok(Some(theme(1, Some(5), None))));
        themes
            .expect_update()
            .return_once(|_, _| Ok(theme(1, Some(5), None)));
        media_repo
            .expect_find_by_id()
            .return_once(|_| Ok(Some(media(41, 99))));
        themes.expect_update_background().times(0);

        let service = ThemeService::new(
            Arc::new(themes),
            media_service(media_repo, MockStorageBackend::new()),
        );
        let request = UpdateThemeRequest {
            bg_image_media_id: Some(Some(MediaId::new(41))),
            ..Default::default()
        };
        let err = service
            .update(ThemeId::new(1), request, UserId::new(5))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
