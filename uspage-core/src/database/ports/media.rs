use async_trait::async_trait;

use crate::error::Result;
use uspage_model::{Media, MediaId, MediaReference, UserId};

/// Insert payload for an uploaded media item; the blob is already stored.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub user_id: UserId,
    pub filename: String,
    pub path: String,
    pub url: String,
    pub mime_type: String,
    pub size: i64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn create(&self, media: NewMedia) -> Result<Media>;

    async fn find_by_id(&self, id: MediaId) -> Result<Option<Media>>;

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Media>>;

    /// Hard-delete the row; returns whether a row was removed.
    async fn delete(&self, id: MediaId) -> Result<bool>;

    /// Every live reference to the media — theme backgrounds, landing
    /// slots and invitation slots — resolved by a single query.
    async fn list_references(&self, id: MediaId) -> Result<Vec<MediaReference>>;
}
