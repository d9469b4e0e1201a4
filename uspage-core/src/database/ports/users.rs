use async_trait::async_trait;

use crate::error::Result;
use uspage_model::{User, UserId};

/// Insert payload for a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    /// Already lowercased by the service.
    pub email: String,
    /// Argon2id hash; never the plain password.
    pub password_hash: String,
}

/// Accounts and their bearer credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Create a user; a duplicate email surfaces as `Conflict`.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// Returns the user together with the stored password hash.
    async fn find_by_email(&self, email: &str) -> Result<Option<(User, String)>>;

    /// Persist a freshly issued token hash under a named kind, deleting
    /// any previous token of the same kind for the user in the same
    /// transaction.
    async fn store_access_token(
        &self,
        user_id: UserId,
        name: &str,
        token_hash: &str,
    ) -> Result<()>;

    /// Resolve a presented token hash to its user, bumping last-used.
    async fn find_user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>>;

    /// Revoke every token of the user, all kinds.
    async fn delete_access_tokens(&self, user_id: UserId) -> Result<u64>;
}
