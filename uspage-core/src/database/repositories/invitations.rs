use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use crate::database::ports::invitations::{
    InvitationChanges, InvitationsRepository, NewInvitation,
};
use crate::error::{CoreError, Result};
use uspage_model::{Invitation, InvitationId, Media, MediaId, UserId};

use super::media::MediaRow;

const INVITATION_COLUMNS: &str = "id, user_id, slug, title, yes_message, \
     no_messages, is_published, created_at, updated_at, deleted_at";

/// PostgreSQL-backed implementation of the `InvitationsRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresInvitationsRepository {
    pool: PgPool,
}

impl PostgresInvitationsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct InvitationRow {
    id: i64,
    user_id: i64,
    slug: String,
    title: String,
    yes_message: String,
    no_messages: Json<Vec<String>>,
    is_published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<InvitationRow> for Invitation {
    fn from(row: InvitationRow) -> Self {
        Invitation {
            id: InvitationId::new(row.id),
            user_id: UserId::new(row.user_id),
            slug: row.slug,
            title: row.title,
            yes_message: row.yes_message,
            no_messages: row.no_messages.0,
            is_published: row.is_published,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[async_trait]
impl InvitationsRepository for PostgresInvitationsRepository {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Invitation>> {
        let rows = sqlx::query_as::<_, InvitationRow>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM invitations
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(user_id.value())
        .fetch_all(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to list invitations: {e}")))?;

        Ok(rows.into_iter().map(Invitation::from).collect())
    }

    async fn find_by_id(&self, id: InvitationId) -> Result<Option<Invitation>> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE id = $1 AND deleted_at IS NULL",
        ))
        .bind(id.value())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to get invitation: {e}")))?;

        Ok(row.map(Invitation::from))
    }

    async fn find_by_id_with_deleted(
        &self,
        id: InvitationId,
    ) -> Result<Option<Invitation>> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE id = $1",
        ))
        .bind(id.value())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to get invitation: {e}")))?;

        Ok(row.map(Invitation::from))
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Invitation>> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM invitations
            WHERE slug = $1 AND is_published = TRUE AND deleted_at IS NULL
            "#,
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CoreError::Database(format!("Failed to get invitation by slug: {e}"))
        })?;

        Ok(row.map(Invitation::from))
    }

    async fn create(&self, invitation: NewInvitation) -> Result<Invitation> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            r#"
            INSERT INTO invitations (
                user_id, slug, title, yes_message, no_messages, is_published
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {INVITATION_COLUMNS}
            "#,
        ))
        .bind(invitation.user_id.value())
        .bind(&invitation.slug)
        .bind(&invitation.title)
        .bind(&invitation.yes_message)
        .bind(Json(&invitation.no_messages))
        .bind(invitation.is_published)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error()
                && db_err.constraint() == Some("invitations_user_id_slug_key")
            {
                return CoreError::Conflict("Slug already in use".to_string());
            }
            CoreError::Database(format!("Failed to create invitation: {e}"))
        })?;

        Ok(Invitation::from(row))
    }

    async fn update(
        &self,
        id: InvitationId,
        changes: InvitationChanges,
    ) -> Result<Invitation> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            r#"
            UPDATE invitations SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                yes_message = COALESCE($4, yes_message),
                no_messages = COALESCE($5, no_messages),
                is_published = COALESCE($6, is_published),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {INVITATION_COLUMNS}
            "#,
        ))
        .bind(id.value())
        .bind(changes.title)
        .bind(changes.slug)
        .bind(changes.yes_message)
        .bind(changes.no_messages.map(Json))
        .bind(changes.is_published)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error()
                && db_err.constraint() == Some("invitations_user_id_slug_key")
            {
                return CoreError::Conflict("Slug already in use".to_string());
            }
            CoreError::Database(format!("Failed to update invitation: {e}"))
        })?;

        row.map(Invitation::from).ok_or(CoreError::NotFound)
    }

    async fn soft_delete(&self, id: InvitationId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.value())
        .execute(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to delete invitation: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn slug_available(
        &self,
        user_id: UserId,
        slug: &str,
        exclude: Option<InvitationId>,
    ) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM invitations
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
        invitation_id: InvitationId,
        media_id: MediaId,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO invitation_media (invitation_id, media_id)
            VALUES ($1, $2)
            ON CONFLICT (invitation_id, media_id) DO NOTHING
            "#,
        )
        .bind(invitation_id.value())
        .bind(media_id.value())
        .execute(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to attach media: {e}")))?;

        Ok(())
    }

    async fn detach_media(
        &self,
        invitation_id: InvitationId,
        media_id: MediaId,
    ) -> Result<()> {
        sqlx::query(
            "DELETE FROM invitation_media WHERE invitation_id = $1 AND media_id = $2",
        )
        .bind(invitation_id.value())
        .bind(media_id.value())
        .execute(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to detach media: {e}")))?;

        Ok(())
    }

    async fn count_media(&self, invitation_id: InvitationId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM invitation_media WHERE invitation_id = $1",
        )
        .bind(invitation_id.value())
        .fetch_one(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to count media: {e}")))?;

        Ok(count)
    }

    async fn list_media(&self, invitation_id: InvitationId) -> Result<Vec<Media>> {
        let rows = sqlx::query_as::<_, MediaRow>(
            r#"
            SELECT m.id, m.user_id, m.filename, m.path, m.url, m.mime_type,
                   m.size, m.created_at
            FROM media m
            JOIN invitation_media im ON im.media_id = m.id
            WHERE im.invitation_id = $1
            ORDER BY im.created_at, m.id
            "#,
        )
        .bind(invitation_id.value())
        .fetch_all(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to list media: {e}")))?;

        Ok(rows.into_iter().map(Media::from).collect())
    }
}
