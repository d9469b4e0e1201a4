//! Landing lifecycle: CRUD, public slug lookup, ordered media gallery.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::database::ports::landings::{
    LandingChanges, LandingsRepository, NewLanding,
};
use crate::database::ports::themes::ThemesRepository;
use crate::error::{CoreError, Result};
use crate::services::media::MediaService;
use uspage_model::{
    CreateLandingRequest, Landing, LandingId, Media, MediaId, MediaOrder,
    ThemeId, UpdateLandingRequest, UserId, slugify,
};

/// A landing holds at most this many linked media items.
pub const MAX_MEDIA_PER_LANDING: i64 = 50;

pub struct LandingService {
    landings: Arc<dyn LandingsRepository>,
    themes: Arc<dyn ThemesRepository>,
    media: Arc<MediaService>,
}

impl fmt::Debug for LandingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LandingService").finish_non_exhaustive()
    }
}

impl LandingService {
    pub fn new(
        landings: Arc<dyn LandingsRepository>,
        themes: Arc<dyn ThemesRepository>,
        media: Arc<MediaService>,
    ) -> Self {
        Self {
            landings,
            themes,
            media,
        }
    }

    /// The user's landings, soft-deleted included.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Landing>> {
        self.landings.list_for_user(user_id).await
    }

    pub async fn create(
        &self,
        user_id: UserId,
        request: CreateLandingRequest,
    ) -> Result<Landing> {
        request.validate()?;
        self.check_theme_available(request.theme_id, user_id).await?;

        let slug = match request.slug.filter(|s| !s.is_empty()) {
            Some(slug) => {
                if !self.landings.slug_available(user_id, &slug, None).await? {
                    return Err(CoreError::validation(
                        "Slug already in use for this user",
                    ));
                }
                slug
            }
            None => {
                self.generate_unique_slug(&request.couple_names, user_id)
                    .await?
            }
        };

        let landing = self
            .landings
            .create(NewLanding {
                user_id,
                theme_id: request.theme_id,
                slug,
                couple_names: request.couple_names,
                anniversary_date: request.anniversary_date,
                bio_text: request.bio_text,
                is_published: true,
            })
            .await
            .map_err(conflict_to_validation)?;

        info!(landing_id = %landing.id, slug = %landing.slug, "created landing");
        Ok(landing)
    }

    pub async fn update(
        &self,
        id: LandingId,
        request: UpdateLandingRequest,
        user_id: UserId,
    ) -> Result<Landing> {
        let landing = self
            .landings
            .find_by_id_with_deleted(id)
            .await?
            .ok_or(CoreError::NotFound)?;
        if landing.user_id != user_id {
            return Err(CoreError::Forbidden);
        }
        request.validate()?;

        if let Some(theme_id) = request.theme_id {
            self.check_theme_available(theme_id, user_id).await?;
        }

        if let Some(slug) = &request.slug
            && *slug != landing.slug
            && !self.landings.slug_available(user_id, slug, Some(id)).await?
        {
            return Err(CoreError::validation("Slug already in use for this user"));
        }

        self.landings
            .update(
                id,
                LandingChanges {
                    couple_names: request.couple_names,
                    slug: request.slug,
                    anniversary_date: request.anniversary_date,
                    theme_id: request.theme_id,
                    bio_text: request.bio_text,
                    is_published: request.is_published,
                },
            )
            .await
            .map_err(conflict_to_validation)
    }

    /// Soft delete; the slug stays reserved while the row exists.
    pub async fn delete(&self, id: LandingId, user_id: UserId) -> Result<()> {
        let landing = self
            .landings
            .find_by_id(id)
            .await?
            .ok_or(CoreError::NotFound)?;
        if landing.user_id != user_id {
            return Err(CoreError::Forbidden);
        }

        self.landings.soft_delete(id).await?;
        Ok(())
    }

    /// Anonymous path: published, live landings only.
    pub async fn find_public_by_slug(&self, slug: &str) -> Result<Landing> {
        self.landings
            .find_published_by_slug(slug)
            .await?
            .ok_or(CoreError::NotFound)
    }

    /// Owner path: numeric id, ownership enforced.
    pub async fn find_for_user(&self, id: LandingId, user_id: UserId) -> Result<Landing> {
        let landing = self
            .landings
            .find_by_id(id)
            .await?
            .ok_or(CoreError::NotFound)?;
        if landing.user_id != user_id {
            return Err(CoreError::Forbidden);
        }
        Ok(landing)
    }

    /// Linked media ordered by sort order.
    pub async fn media(&self, id: LandingId) -> Result<Vec<Media>> {
        self.landings.list_media(id).await
    }

    /// Link a media item under the landing limit.
    ///
    /// Without an explicit `sort_order` the media lands one past the
    /// current maximum. Re-attaching refreshes the stored position.
    pub async fn attach_media(
        &self,
        landing_id: LandingId,
        media_id: MediaId,
        user_id: UserId,
        sort_order: Option<i32>,
    ) -> Result<()> {
        let landing = self
            .landings
            .find_by_id(landing_id)
            .await?
            .ok_or(CoreError::NotFound)?;
        if landing.user_id != user_id {
            return Err(CoreError::Forbidden);
        }

        self.media.find_owned(media_id, user_id).await?;

        if self.landings.count_media(landing_id).await? >= MAX_MEDIA_PER_LANDING {
            return Err(CoreError::validation("Media limit reached for this landing"));
        }

        let sort_order = match sort_order {
            Some(order) => order,
            None => self.landings.max_sort_order(landing_id).await?.unwrap_or(0) + 1,
        };

        self.landings
            .attach_media(landing_id, media_id, sort_order)
            .await
    }

    /// Unlink a media item; detaching a non-linked media is a no-op.
    pub async fn detach_media(
        &self,
        landing_id: LandingId,
        media_id: MediaId,
        user_id: UserId,
    ) -> Result<()> {
        let landing = self
            .landings
            .find_by_id(landing_id)
            .await?
            .ok_or(CoreError::NotFound)?;
        if landing.user_id != user_id {
            return Err(CoreError::Forbidden);
        }

        self.landings.detach_media(landing_id, media_id).await
    }

    /// Batch re-position the gallery.
    pub async fn reorder_media(
        &self,
        landing_id: LandingId,
        orders: &[MediaOrder],
        user_id: UserId,
    ) -> Result<()> {
        let landing = self
            .landings
            .find_by_id(landing_id)
            .await?
            .ok_or(CoreError::NotFound)?;
        if landing.user_id != user_id {
            return Err(CoreError::Forbidden);
        }

        let pairs: Vec<(MediaId, i32)> = orders
            .iter()
            .map(|order| (order.media_id, order.sort_order))
            .collect();
        self.landings.reorder_media(landing_id, &pairs).await
    }

    /// The referenced theme must exist and be system or the user's own.
    async fn check_theme_available(&self, theme_id: ThemeId, user_id: UserId) -> Result<()> {
        let Some(theme) = self.themes.find_by_id(theme_id).await? else {
            return Err(CoreError::validation("Selected theme does not exist"));
        };
        if !theme.is_system() && theme.user_id != Some(user_id) {
            return Err(CoreError::validation("Selected theme is not available"));
        }
        Ok(())
    }

    async fn generate_unique_slug(&self, base: &str, user_id: UserId) -> Result<String> {
        let base = match slugify(base) {
            s if s.is_empty() => "landing".to_string(),
            s => s,
        };

        let mut candidate = base.clone();
        let mut counter = 1u32;
        while !self
            .landings
            .slug_available(user_id, &candidate, None)
            .await?
        {
            candidate = format!("{base}-{counter}");
            counter += 1;
        }
        Ok(candidate)
    }
}

fn conflict_to_validation(err: CoreError) -> CoreError {
    match err {
        CoreError::Conflict(message) => CoreError::Validation(message),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ports::landings::MockLandingsRepository;
    use crate::database::ports::media::MockMediaRepository;
    use crate::database::ports::themes::MockThemesRepository;
    use crate::storage::MockStorageBackend;
    use chrono::{NaiveDate, Utc};
    use uspage_model::Theme;

    fn landing(id: i64, user_id: i64) -> Landing {
        Landing {
            id: LandingId::new(id),
            user_id: UserId::new(user_id),
            theme_id: ThemeId::new(1),
            slug: "ana-y-luis".to_string(),
            couple_names: "Ana y Luis".to_string(),
            anniversary_date: NaiveDate::from_ymd_opt(2020, 2, 14).unwrap(),
            bio_text: None,
            is_published: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn theme(id: i64, user_id: Option<i64>) -> Theme {
        Theme {
            id: ThemeId::new(id),
            user_id: user_id.map(UserId::new),
            name: "Rosa".to_string(),
            description: None,
            primary_color: "#FF5733".to_string(),
            secondary_color: "#FFC300".to_string(),
            bg_color: "#F5F5F5".to_string(),
            bg_image_media_id: None,
            bg_image_url: None,
            css_class: "theme-rosa".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn media(id: i64, user_id: i64) -> Media {
        Media {
            id: MediaId::new(id),
            user_id: UserId::new(user_id),
            filename: "photo.jpg".to_string(),
            path: format!("users/{user_id}/photo.jpg"),
            url: format!("http://localhost/media/users/{user_id}/photo.jpg"),
            mime_type: "image/jpeg".to_string(),
            size: 1024,
            created_at: Utc::now(),
        }
    }

    fn service(
        landings: MockLandingsRepository,
        themes: MockThemesRepository,
        media_repo: MockMediaRepository,
    ) -> LandingService {
        LandingService::new(
            Arc::new(landings),
            Arc::new(themes),
            Arc::new(MediaService::new(
                Arc::new(media_repo),
                Arc::new(MockStorageBackend::new()),
            )),
        )
    }

    fn create_request() -> CreateLandingRequest {
        CreateLandingRequest {
            couple_names: "Ana y Luis".to_string(),
            slug: None,
            anniversary_date: NaiveDate::from_ymd_opt(2020, 2, 14).unwrap(),
            theme_id: ThemeId::new(1),
            bio_text: None,
        }
    }

    #[tokio::test]
    async fn create_derives_slug_from_couple_names() {
        let mut landings = MockLandingsRepository::new();
        let mut themes = MockThemesRepository::new();
        themes
            .expect_find_by_id()
            .return_once(|_| Ok(Some(theme(1, None))));
        landings
            .expect_slug_available()
            .returning(|_, _, _| Ok(true));
        landings
            .expect_create()
            .withf(|new| new.slug == "ana-y-luis" && new.is_published)
            .return_once(|_| Ok(landing(1, 5)));

        let service = service(landings, themes, MockMediaRepository::new());
        service.create(UserId::new(5), create_request()).await.unwrap();
    }

    #[tokio::test]
    async fn create_rejects_foreign_theme() {
        let mut landings = MockLandingsRepository::new();
        let mut themes = MockThemesRepository::new();
        themes
            .expect_find_by_id()
            .return_once(|_| Ok(Some(theme(1, Some(9)))));
        landings.expect_create().times(0);

        let service = service(landings, themes, MockMediaRepository::new());
        let err = service
            .create(UserId::new(5), create_request())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn omitted_sort_order_lands_one_past_the_maximum() {
        let mut landings = MockLandingsRepository::new();
        let mut media_repo = MockMediaRepository::new();
        landings
            .expect_find_by_id()
            .return_once(|_| Ok(Some(landing(1, 5))));
        media_repo
            .expect_find_by_id()
            .return_once(|_| Ok(Some(media(3, 5))));
        landings.expect_count_media().return_once(|_| Ok(4));
        landings.expect_max_sort_order().return_once(|_| Ok(Some(7)));
        landings
            .expect_attach_media()
            .withf(|_, _, sort_order| *sort_order == 8)
            .return_once(|_, _, _| Ok(()));

        let service = service(landings, MockThemesRepository::new(), media_repo);
        service
            .attach_media(LandingId::new(1), MediaId::new(3), UserId::new(5), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn first_attachment_defaults_to_sort_order_one() {
        let mut landings = MockLandingsRepository::new();
        let mut media_repo = MockMediaRepository::new();
        landings
            .expect_find_by_id()
            .return_once(|_| Ok(Some(landing(1, 5))));
        media_repo
            .expect_find_by_id()
            .return_once(|_| Ok(Some(media(3, 5))));
        landings.expect_count_media().return_once(|_| Ok(0));
        landings.expect_max_sort_order().return_once(|_| Ok(None));
        landings
            .expect_attach_media()
            .withf(|_, _, sort_order| *sort_order == 1)
            .return_once(|_, _, _| Ok(()));

        let service = service(landings, MockThemesRepository::new(), media_repo);
        service
            .attach_media(LandingId::new(1), MediaId::new(3), UserId::new(5), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn attach_rejects_past_the_landing_limit() {
        let mut landings = MockLandingsRepository::new();
        let mut media_repo = MockMediaRepository::new();
        landings
            .expect_find_by_id()
            .return_once(|_| Ok(Some(landing(1, 5))));
        media_repo
            .expect_find_by_id()
            .return_once(|_| Ok(Some(media(3, 5))));
        landings
            .expect_count_media()
            .return_once(|_| Ok(MAX_MEDIA_PER_LANDING));
        landings.expect_attach_media().times(0);

        let service = service(landings, MockThemesRepository::new(), media_repo);
        let err = service
            .attach_media(LandingId::new(1), MediaId::new(3), UserId::new(5), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn reorder_requires_ownership() {
        let mut landings = MockLandingsRepository::new();
        landings
            .expect_find_by_id()
            .return_once(|_| Ok(Some(landing(1, 5))));
        landings.expect_reorder_media().times(0);

        let service = service(
            landings,
            MockThemesRepository::new(),
            MockMediaRepository::new(),
        );
        let err = service
            .reorder_media(
                LandingId::new(1),
                &[MediaOrder {
                    media_id: MediaId::new(3),
                    sort_order: 2,
                }],
                UserId::new(9),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden));
    }

    #[tokio::test]
    async fn reorder_forwards_all_pairs() {
        let mut landings = MockLandingsRepository::new();
        landings
            .expect_find_by_id()
            .return_once(|_| Ok(Some(landing(1, 5))));
        landings
            .expect_reorder_media()
            .withf(|_, pairs| {
                pairs.len() == 2
                    && pairs[0] == (MediaId::new(3), 2)
                    && pairs[1] == (MediaId::new(4), 1)
            })
            .return_once(|_, _| Ok(()));

        let service = service(
            landings,
            MockThemesRepository::new(),
            MockMediaRepository::new(),
        );
        service
            .reorder_media(
                LandingId::new(1),
                &[
                    MediaOrder {
                        media_id: MediaId::new(3),
                        sort_order: 2,
                    },
                    MediaOrder {
                        media_id: MediaId::new(4),
                        sort_order: 1,
                    },
                ],
                UserId::new(5),
            )
            .await
            .unwrap();
    }
}
