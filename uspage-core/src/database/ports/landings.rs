use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use uspage_model::{Landing, LandingId, Media, MediaId, ThemeId, UserId};

/// Insert payload for a landing. The slug is already resolved by the
/// service; the `(user_id, slug)` unique index has the final word.
#[derive(Debug, Clone)]
pub struct NewLanding {
    pub user_id: UserId,
    pub theme_id: ThemeId,
    pub slug: String,
    pub couple_names: String,
    pub anniversary_date: NaiveDate,
    pub bio_text: Option<String>,
    pub is_published: bool,
}

/// Scalar updates; `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct LandingChanges {
    pub couple_names: Option<String>,
    pub slug: Option<String>,
    pub anniversary_date: Option<NaiveDate>,
    pub theme_id: Option<ThemeId>,
    pub bio_text: Option<String>,
    pub is_published: Option<bool>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LandingsRepository: Send + Sync {
    /// The user's landings, soft-deleted included, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Landing>>;

    /// Excludes soft-deleted rows.
    async fn find_by_id(&self, id: LandingId) -> Result<Option<Landing>>;

    /// Includes soft-deleted rows.
    async fn find_by_id_with_deleted(&self, id: LandingId) -> Result<Option<Landing>>;

    /// Public path: published and not soft-deleted only.
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Landing>>;

    /// A slug collision (racing the advisory check) surfaces as
    /// `Conflict`.
    async fn create(&self, landing: NewLanding) -> Result<Landing>;

    async fn update(&self, id: LandingId, changes: LandingChanges) -> Result<Landing>;

    /// Soft delete; returns whether a live row was marked.
    async fn soft_delete(&self, id: LandingId) -> Result<bool>;

    /// Advisory uniqueness check, optionally excluding the entity itself.
    async fn slug_available(
        &self,
        user_id: UserId,
        slug: &str,
        exclude: Option<LandingId>,
    ) -> Result<bool>;

    /// Upsert a join row; re-attaching refreshes the sort order.
    async fn attach_media(
        &self,
        landing_id: LandingId,
        media_id: MediaId,
        sort_order: i32,
    ) -> Result<()>;

    /// Idempotent: detaching a non-linked media is a no-op.
    async fn detach_media(&self, landing_id: LandingId, media_id: MediaId) -> Result<()>;

    async fn count_media(&self, landing_id: LandingId) -> Result<i64>;

    async fn max_sort_order(&self, landing_id: LandingId) -> Result<Option<i32>>;

    /// Batch-update sort orders for existing join rows.
    async fn reorder_media(
        &self,
        landing_id: LandingId,
        orders: &[(MediaId, i32)],
    ) -> Result<()>;

    /// Linked media ordered by sort order.
    async fn list_media(&self, landing_id: LandingId) -> Result<Vec<Media>>;
}
