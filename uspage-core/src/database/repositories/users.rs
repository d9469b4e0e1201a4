use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use crate::database::ports::users::{NewUser, UsersRepository};
use crate::error::{CoreError, Result};
use uspage_model::{User, UserId};

/// PostgreSQL-backed implementation of the `UsersRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresUsersRepository {
    pool: PgPool,
}

impl PostgresUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::new(row.id),
            email: row.email,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error()
                && db_err.constraint() == Some("users_email_key")
            {
                return CoreError::Conflict("Email already registered".to_string());
            }
            CoreError::Database(format!("Failed to create user: {e}"))
        })?;

        let user = User::from(row);
        info!(user_id = %user.id, "created user");
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to get user by id: {e}")))?;

        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<(User, String)>> {
        #[derive(sqlx::FromRow)]
        struct UserWithHashRow {
            id: i64,
            email: String,
            name: String,
            password_hash: String,
            created_at: DateTime<Utc>,
            updated_at: DateTime<Utc>,
        }

        let row = sqlx::query_as::<_, UserWithHashRow>(
            r#"
            SELECT id, email, name, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to get user by email: {e}")))?;

        Ok(row.map(|r| {
            (
                User {
                    id: UserId::new(r.id),
                    email: r.email,
                    name: r.name,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                },
                r.password_hash,
            )
        }))
    }

    async fn store_access_token(
        &self,
        user_id: UserId,
        name: &str,
        token_hash: &str,
    ) -> Result<()> {
        let mut tx = self.pool().begin().await.map_err(|e| {
            CoreError::Database(format!("Failed to start transaction: {e}"))
        })?;

        // One live token per (user, kind): issuing replaces the previous.
        sqlx::query("DELETE FROM access_tokens WHERE user_id = $1 AND name = $2")
            .bind(user_id.value())
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                CoreError::Database(format!("Failed to revoke previous tokens: {e}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO access_tokens (user_id, name, token_hash)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id.value())
        .bind(name)
        .bind(token_hash)
        .execute(&mut *tx)
        .await
        .map_err(|e| CoreError::Database(format!("Failed to store token: {e}")))?;

        tx.commit().await.map_err(|e| {
            CoreError::Database(format!("Failed to commit transaction: {e}"))
        })?;

        Ok(())
    }

    async fn find_user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.email, u.name, u.created_at, u.updated_at
            FROM users u
            JOIN access_tokens t ON t.user_id = u.id
            WHERE t.token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CoreError::Database(format!("Failed to resolve token: {e}")))?;

        if row.is_some() {
            sqlx::query("UPDATE access_tokens SET last_used_at = NOW() WHERE token_hash = $1")
                .bind(token_hash)
                .execute(self.pool())
                .await
                .map_err(|e| {
                    CoreError::Database(format!("Failed to touch token: {e}"))
                })?;
        }

        Ok(row.map(User::from))
    }

    async fn delete_access_tokens(&self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE user_id = $1")
            .bind(user_id.value())
            .execute(self.pool())
            .await
            .map_err(|e| CoreError::Database(format!("Failed to revoke tokens: {e}")))?;

        Ok(result.rows_affected())
    }
}
