use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::ports::themes::{NewTheme, ThemeChanges, ThemesRepository};
use crate::error::{CoreError, Result};
use uspage_model::{MediaId, Theme, ThemeId, UserId};

const THEME_COLUMNS: &str = "id, user_id, name, description, primary_color, \
     secondary_color, bg_color, bg_image_media_id, bg_image_url, css_class, \
     created_at, updated_at";

/// PostgreSQL-backed implementation of the `ThemesRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresThemesRepository {
    pool: PgPool,
}

impl PostgresThemesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct ThemeRow {
    id: i64,
    user_id: Option<i64>,
    name: String,
    description: Option<String>,
    primary_color: String,
    secondary_color: String,
    bg_color: String,
    bg_image_media_id: Option<i64>,
    bg_image_url: Option<String>,
    css_class: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ThemeRow> for Theme {
    fn from(row: ThemeRow) -> Self {
        Theme {
            id: ThemeId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            name: row.name,
            description: row.description,
            primary_color: row.primary_color,
            secondary_color: row.secondary_color,
            bg_color: row.bg_color,
            bg_image_media_id: row.bg_image_media_id.map(MediaId::new),
            bg_image_url: row.bg_image_url,
            css_class: row.css_class,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ThemesRepository for PostgresThemesRepository {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Theme>> {
        let rows = sqlx::query_as::<_, ThemeRow>(&format!(
            r#"
            SELECT {THEME_COLUMNS}
            FROM themes
            WHERE user_id IS NULL OR user_id = $1
            ORDER BY name
            "#,
        ))
        .bind(user_id.value())
        .fetch_all(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to list themes: {e}")))?;

        Ok(rows.into_iter().map(Theme::from).collect())
    }

    async fn find_by_id(&self, id: ThemeId) -> Result<Option<Theme>> {
        let row = sqlx::query_as::<_, ThemeRow>(&format!(
            "SELECT {THEME_COLUMNS} FROM themes WHERE id = $1",
        ))
        .bind(id.value())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to get theme: {e}")))?;

        Ok(row.map(Theme::from))
    }

    async fn create(&self, theme: NewTheme) -> Result<Theme> {
        let (bg_media_id, bg_url) = match theme.bg_image {
            Some((id, url)) => (Some(id.value()), Some(url)),
            None => (None, None),
        };

        let row = sqlx::query_as::<_, ThemeRow>(&format!(
            r#"
            INSERT INTO themes (
                user_id, name, description, primary_color, secondary_color,
                bg_color, css_class, bg_image_media_id, bg_image_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {THEME_COLUMNS}
            "#,
        ))
        .bind(theme.user_id.value())
        .bind(&theme.name)
        .bind(&theme.description)
        .bind(&theme.primary_color)
        .bind(&theme.secondary_color)
        .bind(&theme.bg_color)
        .bind(&theme.css_class)
        .bind(bg_media_id)
        .bind(bg_url)
        .fetch_one(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to create theme: {e}")))?;

        Ok(Theme::from(row))
    }

    async fn update(&self, id: ThemeId, changes: ThemeChanges) -> Result<Theme> {
        let row = sqlx::query_as::<_, ThemeRow>(&format!(
            r#"
            UPDATE themes SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                primary_color = COALESCE($4, primary_color),
                secondary_color = COALESCE($5, secondary_color),
                bg_color = COALESCE($6, bg_color),
                css_class = COALESCE($7, css_class),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {THEME_COLUMNS}
            "#,
        ))
        .bind(id.value())
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.primary_color)
        .bind(changes.secondary_color)
        .bind(changes.bg_color)
        .bind(changes.css_class)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to update theme: {e}")))?;

        row.map(Theme::from).ok_or(CoreError::NotFound)
    }

    async fn update_background(
        &self,
        id: ThemeId,
        background: Option<(MediaId, String)>,
    ) -> Result<Theme> {
        let (media_id, url) = match background {
            Some((id, url)) => (Some(id.value()), Some(url)),
            None => (None, None),
        };

        let row = sqlx::query_as::<_, ThemeRow>(&format!(
            r#"
            UPDATE themes SET
                bg_image_media_id = $2,
                bg_image_url = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {THEME_COLUMNS}
            "#,
        ))
        .bind(id.value())
        .bind(media_id)
        .bind(url)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CoreError::Database(format!("Failed to update theme background: {e}"))
        })?;

        row.map(Theme::from).ok_or(CoreError::NotFound)
    }

    async fn delete(&self, id: ThemeId) -> Result<()> {
        let result = sqlx::query("DELETE FROM themes WHERE id = $1")
            .bind(id.value())
            .execute(self.pool())
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error()
                    && db_err.constraint() == Some("landings_theme_id_fkey")
                {
                    return CoreError::Validation(
                        "Theme is in use by existing landings".to_string(),
                    );
                }
                CoreError::Database(format!("Failed to delete theme: {e}"))
            })?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound);
        }
        Ok(())
    }
}
