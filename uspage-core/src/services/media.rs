//! Media lifecycle: upload, the in-use delete guard, and force delete.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::database::ports::media::{MediaRepository, NewMedia};
use crate::error::{CoreError, Result};
use crate::storage::StorageBackend;
use uspage_model::{Media, MediaId, MediaUpload, UserId};

/// Accepted upload content types.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpg",
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Maximum upload size, 10 MiB.
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

pub struct MediaService {
    media: Arc<dyn MediaRepository>,
    storage: Arc<dyn StorageBackend>,
}

impl fmt::Debug for MediaService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaService").finish_non_exhaustive()
    }
}

impl MediaService {
    pub fn new(media: Arc<dyn MediaRepository>, storage: Arc<dyn StorageBackend>) -> Self {
        Self { media, storage }
    }

    /// Store the blob, then insert the row.
    ///
    /// If the insert fails the blob stays behind as an orphan; that is an
    /// accepted gap rather than something to roll back.
    pub async fn upload(&self, user_id: UserId, upload: MediaUpload) -> Result<Media> {
        self.validate_file(&upload)?;

        let path = self.generate_file_path(user_id, &upload);
        let stored = self.storage.put(&path, &upload.bytes).await?;
        let url = self.storage.url(&stored);

        self.media
            .create(NewMedia {
                user_id,
                filename: upload.filename.clone(),
                path: stored,
                url,
                mime_type: upload.mime_type.clone(),
                size: upload.bytes.len() as i64,
            })
            .await
    }

    /// Delete on user request.
    ///
    /// Returns `false` — a "not deletable" signal rather than an error —
    /// when the media is missing, not owned by `user_id`, or still
    /// referenced by any theme background, landing slot or invitation
    /// slot.
    pub async fn delete(&self, id: MediaId, user_id: UserId) -> Result<bool> {
        let Some(media) = self.media.find_by_id(id).await? else {
            return Ok(false);
        };
        if media.user_id != user_id {
            return Ok(false);
        }
        if !self.media.list_references(id).await?.is_empty() {
            return Ok(false);
        }

        self.remove_blob(&media).await?;
        self.media.delete(id).await
    }

    /// Cascade path: bypasses the in-use guard and the ownership check.
    ///
    /// Only reachable from theme create/update/delete flows that own the
    /// referenced media's lifecycle; never routed to an endpoint.
    pub async fn force_delete(&self, id: MediaId) -> Result<bool> {
        let Some(media) = self.media.find_by_id(id).await? else {
            return Ok(false);
        };

        self.remove_blob(&media).await?;
        let deleted = self.media.delete(id).await?;
        if deleted {
            info!(media_id = %id, "force deleted media");
        }
        Ok(deleted)
    }

    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Media>> {
        self.media.list_for_user(user_id).await
    }

    pub async fn find_by_id(&self, id: MediaId) -> Result<Option<Media>> {
        self.media.find_by_id(id).await
    }

    /// Resolve a media the caller wants to link somewhere.
    ///
    /// A missing or cross-user media is a validation failure, surfacing
    /// as a field-level 422 — uniformly, on every attach path.
    pub async fn find_owned(&self, id: MediaId, user_id: UserId) -> Result<Media> {
        let Some(media) = self.media.find_by_id(id).await? else {
            return Err(CoreError::validation("Selected media does not exist"));
        };
        if media.user_id != user_id {
            return Err(CoreError::validation(
                "You do not have permission to use this media",
            ));
        }
        Ok(media)
    }

    fn validate_file(&self, upload: &MediaUpload) -> Result<()> {
        if !ALLOWED_MIME_TYPES.contains(&upload.mime_type.as_str()) {
            return Err(CoreError::validation(
                "File type not allowed: expected jpg, jpeg, png, webp or gif",
            ));
        }
        if upload.bytes.len() > MAX_FILE_BYTES {
            return Err(CoreError::validation("File too large (max 10MB)"));
        }
        Ok(())
    }

    fn generate_file_path(&self, user_id: UserId, upload: &MediaUpload) -> String {
        let extension = upload.extension().unwrap_or_else(|| {
            upload
                .mime_type
                .rsplit_once('/')
                .map(|(_, sub)| sub.to_string())
                .unwrap_or_else(|| "bin".to_string())
        });
        format!("users/{}/{}.{}", user_id, Uuid::new_v4(), extension)
    }

    /// Best-effort blob removal: an already-absent blob is not an error.
    async fn remove_blob(&self, media: &Media) -> Result<()> {
        if self.storage.exists(&media.path).await? {
            self.storage.delete(&media.path).await?;
        } else {
            warn!(media_id = %media.id, path = %media.path, "blob already absent");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ports::media::MockMediaRepository;
    use crate::storage::MockStorageBackend;
    use chrono::Utc;
    use mockall::Sequence;
    use uspage_model::MediaReference;

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

    fn upload() -> MediaUpload {
        MediaUpload {
            filename: "photo.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            bytes: vec![0xFF; 512],
        }
    }

    #[tokio::test]
    async fn upload_writes_blob_before_row() {
        let mut repo = MockMediaRepository::new();
        let mut storage = MockStorageBackend::new();
        let mut seq = Sequence::new();

        storage
            .expect_put()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|path, _| Ok(path.to_string()));
        storage
            .expect_url()
            .returning(|path| format!("http://localhost/media/{path}"));
        repo.expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|new| {
                new.user_id.value() == 3
                    && new.path.starts_with("users/3/")
                    && new.path.ends_with(".jpg")
                    && new.size == 512
            })
            .return_once(|_| Ok(media(1, 3)));

        let service = MediaService::new(Arc::new(repo), Arc::new(storage));
        service.upload(UserId::new(3), upload()).await.unwrap();
    }

    #[tokio::test]
    async fn upload_rejects_disallowed_mime_type() {
        let service = MediaService::new(
            Arc::new(MockMediaRepository::new()),
            Arc::new(MockStorageBackend::new()),
        );

        let mut bad = upload();
        bad.mime_type = "application/pdf".to_string();
        let err = service.upload(UserId::new(1), bad).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn upload_rejects_oversized_file() {
        let service = MediaService::new(
            Arc::new(MockMediaRepository::new()),
            Arc::new(MockStorageBackend::new()),
        );

        let mut big = upload();
        big.bytes = vec![0; MAX_FILE_BYTES + 1];
        let err = service.upload(UserId::new(1), big).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_refuses_while_referenced() {
        let mut repo = MockMediaRepository::new();
        repo.expect_find_by_id()
            .return_once(|_| Ok(Some(media(1, 3))));
        repo.expect_list_references().return_once(|_| {
            Ok(vec![MediaReference::ThemeBackground {
                theme_id: uspage_model::ThemeId::new(9),
            }])
        });
        repo.expect_delete().times(0);

        let service =
            MediaService::new(Arc::new(repo), Arc::new(MockStorageBackend::new()));
        let deleted = service
            .delete(MediaId::new(1), UserId::new(3))
            .await
            .unwrap();
        assert!(!deleted);
    }

    #[tokio::test]
    async fn delete_refuses_foreign_media() {
        let mut repo = MockMediaRepository::new();
        repo.expect_find_by_id()
            .return_once(|_| Ok(Some(media(1, 3))));

        let service =
            MediaService::new(Arc::new(repo), Arc::new(MockStorageBackend::new()));
        let deleted = service
            .delete(MediaId::new(1), UserId::new(4))
            .await
            .unwrap();
        assert!(!deleted);
    }

    #[tokio::test]
    async fn delete_succeeds_once_unreferenced() {
        let mut repo = MockMediaRepository::new();
        let mut storage = MockStorageBackend::new();
        repo.expect_find_by_id()
            .return_once(|_| Ok(Some(media(1, 3))));
        repo.expect_list_references().return_once(|_| Ok(vec![]));
        storage
            .expect_exists()
            .withf(|path| path == "users/3/photo.jpg")
            .return_once(|_| Ok(true));
        storage
            .expect_delete()
            .withf(|path| path == "users/3/photo.jpg")
            .return_once(|_| Ok(()));
        repo.expect_delete().return_once(|_| Ok(true));

        let service = MediaService::new(Arc::new(repo), Arc::new(storage));
        let deleted = service
            .delete(MediaId::new(1), UserId::new(3))
            .await
            .unwrap();
        assert!(deleted);
    }

    #[tokio::test]
    async fn absent_blob_does_not_fail_deletion() {
        let mut repo = MockMediaRepository::new();
        let mut storage = MockStorageBackend::new();
        repo.expect_find_by_id()
            .return_once(|_| Ok(Some(media(1, 3))));
        repo.expect_list_references().return_once(|_| Ok(vec![]));
        storage.expect_exists().return_once(|_| Ok(false));
        storage.expect_delete().times(0);
        repo.expect_delete().return_once(|_| Ok(true));

        let service = MediaService::new(Arc::new(repo), Arc::new(storage));
        assert!(
            service
                .delete(MediaId::new(1), UserId::new(3))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn force_delete_ignores_references_and_ownership() {
        let mut repo = MockMediaRepository::new();
        let mut storage = MockStorageBackend::new();
        repo.expect_find_by_id()
            .return_once(|_| Ok(Some(media(1, 3))));
        repo.expect_list_references().times(0);
        storage.expect_exists().return_once(|_| Ok(true));
        storage.expect_delete().return_once(|_| Ok(()));
        repo.expect_delete().return_once(|_| Ok(true));

        let service = MediaService::new(Arc::new(repo), Arc::new(storage));
        assert!(service.force_delete(MediaId::new(1)).await.unwrap());
    }

    #[tokio::test]
    async fn find_owned_rejects_cross_user_media() {
        let mut repo = MockMediaRepository::new();
        repo.expect_find_by_id()
            .return_once(|_| Ok(Some(media(1, 3))));

        let service =
            MediaService::new(Arc::new(repo), Arc::new(MockStorageBackend::new()));
        let err = service
            .find_owned(MediaId::new(1), UserId::new(9))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
