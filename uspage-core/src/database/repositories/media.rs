use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use crate::database::ports::media::{MediaRepository, NewMedia};
use crate::error::{CoreError, Result};
use uspage_model::{
    InvitationId, LandingId, Media, MediaId, MediaReference, ThemeId, UserId,
};

const MEDIA_COLUMNS: &str =
    "id, user_id, filename, path, url, mime_type, size, created_at";

/// PostgreSQL-backed implementation of the `MediaRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresMediaRepository {
    pool: PgPool,
}

impl PostgresMediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct MediaRow {
    pub(super) id: i64,
    pub(super) user_id: i64,
    pub(super) filename: String,
    pub(super) path: String,
    pub(super) url: String,
    pub(super) mime_type: String,
    pub(super) size: i64,
    pub(super) created_at: DateTime<Utc>,
}

impl From<MediaRow> for Media {
    fn from(row: MediaRow) -> Self {
        Media {
            id: MediaId::new(row.id),
            user_id: UserId::new(row.user_id),
            filename: row.filename,
            path: row.path,
            url: row.url,
            mime_type: row.mime_type,
            size: row.size,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl MediaRepository for PostgresMediaRepository {
    async fn create(&self, media: NewMedia) -> Result<Media> {
        let row = sqlx::query_as::<_, MediaRow>(&format!(
            r#"
            INSERT INTO media (user_id, filename, path, url, mime_type, size)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {MEDIA_COLUMNS}
            "#,
        ))
        .bind(media.user_id.value())
        .bind(&media.filename)
        .bind(&media.path)
        .bind(&media.url)
        .bind(&media.mime_type)
        .bind(media.size)
        .fetch_one(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to create media: {e}")))?;

        let media = Media::from(row);
        info!(media_id = %media.id, path = %media.path, "created media");
        Ok(media)
    }

    async fn find_by_id(&self, id: MediaId) -> Result<Option<Media>> {
        let row = sqlx::query_as::<_, MediaRow>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media WHERE id = $1",
        ))
        .bind(id.value())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to get media: {e}")))?;

        Ok(row.map(Media::from))
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Media>> {
        let rows = sqlx::query_as::<_, MediaRow>(&format!(
            r#"
            SELECT {MEDIA_COLUMNS}
            FROM media
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(user_id.value())
        .fetch_all(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to list media: {e}")))?;

        Ok(rows.into_iter().map(Media::from).collect())
    }

    async fn delete(&self, id: MediaId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id.value())
            .execute(self.pool())
            .await
            .map_err(|e| CoreError::Database(format!("Failed to delete media: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_references(&self, id: MediaId) -> Result<Vec<MediaReference>> {
        #[derive(sqlx::FromRow)]
        struct ReferenceRow {
            kind: String,
            entity_id: i64,
            sort_order: Option<i32>,
        }

        // All three reference kinds in one pass; the in-use guard audits
        // this single result set.
        let rows = sqlx::query_as::<_, ReferenceRow>(
            r#"
            SELECT 'theme' AS kind, id AS entity_id, NULL::INT AS sort_order
            FROM themes WHERE bg_image_media_id = $1
            UNION ALL
            SELECT 'landing', landing_id, sort_order
            FROM landing_media WHERE media_id = $1
            UNION ALL
            SELECT 'invitation', invitation_id, NULL::INT
            FROM invitation_media WHERE media_id = $1
            "#,
        )
        .bind(id.value())
        .fetch_all(self.pool())
        .await
        .map_err(|e| {
            CoreError::Database(format!("Failed to list media references: {e}"))
        })?;

        rows.into_iter()
            .map(|row| match row.kind.as_str() {
                "theme" => Ok(MediaReference::ThemeBackground {
                    theme_id: ThemeId::new(row.entity_id),
                }),
                "landing" => Ok(MediaReference::LandingSlot {
                    landing_id: LandingId::new(row.entity_id),
                    sort_order: row.sort_order.unwrap_or_default(),
                }),
                "invitation" => Ok(MediaReference::InvitationSlot {
                    invitation_id: InvitationId::new(row.entity_id),
                }),
                other => Err(CoreError::Database(format!(
                    "Unknown media reference kind: {other}"
                ))),
            })
            .collect()
    }
}
