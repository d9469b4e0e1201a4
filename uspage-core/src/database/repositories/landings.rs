use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::database::ports::landings::{
    LandingChanges, LandingsRepository, NewLanding,
};
use crate::error::{CoreError, Result};
use uspage_model::{Landing, LandingId, Media, MediaId, ThemeId, UserId};

use super::media::MediaRow;

const LANDING_COLUMNS: &str = "id, user_id, theme_id, slug, couple_names, \
     anniversary_date, bio_text, is_published, created_at, updated_at, \
     deleted_at";

/// PostgreSQL-backed implementation of the `LandingsRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresLandingsRepository {
    pool: PgPool,
}

impl PostgresLandingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct LandingRow {
    id: i64,
    user_id: i64,
    theme_id: i64,
    slug: String,
    couple_names: String,
    anniversary_date: NaiveDate,
    bio_text: Option<String>,
    is_published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<LandingRow> for Landing {
    fn from(row: LandingRow) -> Self {
        Landing {
            id: LandingId::new(row.id),
            user_id: UserId::new(row.user_id),
            theme_id: ThemeId::new(row.theme_id),
            slug: row.slug,
            couple_names: row.couple_names,
            anniversary_date: row.anniversary_date,
            bio_text: row.bio_text,
            is_published: row.is_published,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[async_trait]
impl LandingsRepository for PostgresLandingsRepository {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Landing>> {
        let rows = sqlx::query_as::<_, LandingRow>(&format!(
            r#"
            SELECT {LANDING_COLUMNS}
            FROM landings
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(user_id.value())
        .fetch_all(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to list landings: {e}")))?;

        Ok(rows.into_iter().map(Landing::from).collect())
    }

    async fn find_by_id(&self, id: LandingId) -> Result<Option<Landing>> {
        let row = sqlx::query_as::<_, LandingRow>(&format!(
            "SELECT {LANDING_COLUMNS} FROM landings WHERE id = $1 AND deleted_at IS NULL",
        ))
        .bind(id.value())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to get landing: {e}")))?;

        Ok(row.map(Landing::from))
    }

    async fn find_by_id_with_deleted(&self, id: LandingId) -> Result<Option<Landing>> {
        let row = sqlx::query_as::<_, LandingRow>(&format!(
            "SELECT {LANDING_COLUMNS} FROM landings WHERE id = $1",
        ))
        .bind(id.value())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to get landing: {e}")))?;

        Ok(row.map(Landing::from))
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Landing>> {
        let row = sqlx::query_as::<_, LandingRow>(&format!(
            r#"
            SELECT {LANDING_COLUMNS}
            FROM landings
            WHERE slug = $1 AND is_published = TRUE AND deleted_at IS NULL
            "#,
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CoreError::Database(format!("Failed to get landing by slug: {e}"))
        })?;

        Ok(row.map(Landing::from))
    }

    async fn create(&self, landing: NewLanding) -> Result<Landing> {
        let row = sqlx::query_as::<_, LandingRow>(&format!(
            r#"
            INSERT INTO landings (
                user_id, theme_id, slug, couple_names, anniversary_date,
                bio_text, is_published
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {LANDING_COLUMNS}
            "#,
        ))
        .bind(landing.user_id.value())
        .bind(landing.theme_id.value())
        .bind(&landing.slug)
        .bind(&landing.couple_names)
        .bind(landing.anniversary_date)
        .bind(&landing.bio_text)
        .bind(landing.is_published)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error()
                && db_err.constraint() == Some("landings_user_id_slug_key")
            {
                return CoreError::Conflict("Slug already in use".to_string());
            }
            CoreError::Database(format!("Failed to create landing: {e}"))
        })?;

        Ok(Landing::from(row))
    }

    async fn update(&self, id: LandingId, changes: LandingChanges) -> Result<Landing> {
        let row = sqlx::query_as::<_, LandingRow>(&format!(
            r#"
            UPDATE landings SET
                couple_names = COALESCE($2, couple_names),
                slug = COALESCE($3, slug),
                anniversary_date = COALESCE($4, anniversary_date),
                theme_id = COALESCE($5, theme_id),
                bio_text = COALESCE($6, bio_text),
                is_published = COALESCE($7, is_published),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {LANDING_COLUMNS}
            "#,
        ))
        .bind(id.value())
        .bind(changes.couple_names)
        .bind(changes.slug)
        .bind(changes.anniversary_date)
        .bind(changes.theme_id.map(|t| t.value()))
        .bind(changes.bio_text)
        .bind(changes.is_published)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error()
                && db_err.constraint() == Some("landings_user_id_slug_key")
            {
                return CoreError::Conflict("Slug already in use".to_string());
            }
            CoreError::Database(format!("Failed to update landing: {e}"))
        })?;

        row.map(Landing::from).ok_or(CoreError::NotFound)
    }

    async fn soft_delete(&self, id: LandingId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE landings
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.value())
        .execute(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to delete landing: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn slug_available(
        &self,
        user_id: UserId,
        slug: &str,
        exclude: Option<LandingId>,
    ) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM landings
                WHERE user_id = $1 AND slug = $2 AND ($3::BIGINT IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(user_id.value())
        .bind(slug)
        .bind(exclude.map(|id| id.value()))
        .fetch_one(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to check slug: {e}")))?;

        Ok(!taken)
    }

    async fn attach_media(
        &self,
        landing_id: LandingId,
        media_id: MediaId,
        sort_order: i32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO landing_media (landing_id, media_id, sort_order)
            VALUES ($1, $2, $3)
            ON CONFLICT (landing_id, media_id)
            DO UPDATE SET sort_order = EXCLUDED.sort_order
            "#,
        )
        .bind(landing_id.value())
        .bind(media_id.value())
        .bind(sort_order)
        .execute(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to attach media: {e}")))?;

        Ok(())
    }

    async fn detach_media(&self, landing_id: LandingId, media_id: MediaId) -> Result<()> {
        sqlx::query(
            "DELETE FROM landing_media WHERE landing_id = $1 AND media_id = $2",
        )
        .bind(landing_id.value())
        .bind(media_id.value())
        .execute(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to detach media: {e}")))?;

        Ok(())
    }

    async fn count_media(&self, landing_id: LandingId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM landing_media WHERE landing_id = $1",
        )
        .bind(landing_id.value())
        .fetch_one(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to count media: {e}")))?;

        Ok(count)
    }

    async fn max_sort_order(&self, landing_id: LandingId) -> Result<Option<i32>> {
        let max: Option<i32> = sqlx::query_scalar(
            "SELECT MAX(sort_order) FROM landing_media WHERE landing_id = $1",
        )
        .bind(landing_id.value())
        .fetch_one(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to read sort order: {e}")))?;

        Ok(max)
    }

    async fn reorder_media(
        &self,
        landing_id: LandingId,
        orders: &[(MediaId, i32)],
    ) -> Result<()> {
        let mut tx = self.pool().begin().await.map_err(|e| {
            CoreError::Database(format!("Failed to start transaction: {e}"))
        })?;

        for &(media_id, sort_order) in orders {
            sqlx::query(
                r#"
                UPDATE landing_media
                SET sort_order = $3
                WHERE landing_id = $1 AND media_id = $2
                "#,
            )
            .bind(landing_id.value())
            .bind(media_id.value())
            .bind(sort_order)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                CoreError::Database(format!("Failed to reorder media: {e}"))
            })?;
        }

        tx.commit().await.map_err(|e| {
            CoreError::Database(format!("Failed to commit transaction: {e}"))
        })?;

        Ok(())
    }

    async fn list_media(&self, landing_id: LandingId) -> Result<Vec<Media>> {
        let rows = sqlx::query_as::<_, MediaRow>(
            r#"
            SELECT m.id, m.user_id, m.filename, m.path, m.url, m.mime_type,
                   m.size, m.created_at
            FROM media m
            JOIN landing_media lm ON lm.media_id = m.id
            WHERE lm.landing_id = $1
            ORDER BY lm.sort_order
            "#,
        )
        .bind(landing_id.value())
        .fetch_all(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to list media: {e}")))?;

        Ok(rows.into_iter().map(Media::from).collect())
    }
}
