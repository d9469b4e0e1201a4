//! Authentication: registration, login, and opaque bearer tokens.
//!
//! Tokens are high-entropy secrets stored as SHA-256 hashes; issuing a
//! token of a given kind revokes the previous one of the same kind, so
//! repeated logins never accumulate credentials. Password verification
//! goes through Argon2id, which compares in constant time.

use std::fmt;
use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::database::ports::users::{NewUser, UsersRepository};
use crate::error::{CoreError, Result};
use uspage_model::{AuthToken, LoginRequest, RegisterRequest, User, UserId};

/// Token kind issued by login and register.
pub const AUTH_TOKEN: &str = "auth_token";
/// Token kind issued by the explicit token endpoint.
pub const WEB_TOKEN: &str = "web_token";

pub struct AuthService {
    users: Arc<dyn UsersRepository>,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService").finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(users: Arc<dyn UsersRepository>) -> Self {
        Self { users }
    }

    /// Create an account and issue a credential exactly like a login.
    pub async fn register(&self, request: RegisterRequest) -> Result<(User, AuthToken)> {
        request.validate()?;

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(request.password.as_bytes(), &salt)
            .map_err(|_| CoreError::Internal("Failed to hash password".to_string()))?
            .to_string();

        let user = self
            .users
            .create_user(NewUser {
                name: request.name,
                email: request.email.to_lowercase(),
                password_hash,
            })
            .await?;

        let token = self.issue_token(user.id, AUTH_TOKEN).await?;
        info!(user_id = %user.id, "registered user");
        Ok((user, token))
    }

    /// Verify credentials and rotate the `auth_token` credential.
    ///
    /// Unknown email and wrong password collapse into the same
    /// `InvalidCredentials`; callers must not learn which one failed.
    pub async fn login(&self, request: LoginRequest) -> Result<(User, AuthToken)> {
        let Some((user, password_hash)) = self
            .users
            .find_by_email(&request.email.to_lowercase())
            .await?
        else {
            return Err(CoreError::InvalidCredentials);
        };

        let parsed = PasswordHash::new(&password_hash).map_err(|_| {
            CoreError::Internal("Stored password hash is invalid".to_string())
        })?;
        Argon2::default()
            .verify_password(request.password.as_bytes(), &parsed)
            .map_err(|_| CoreError::InvalidCredentials)?;

        let token = self.issue_token(user.id, AUTH_TOKEN).await?;
        Ok((user, token))
    }

    /// Issue a fresh named token, revoking the previous one of the same
    /// kind for this user.
    pub async fn issue_token(&self, user_id: UserId, name: &str) -> Result<AuthToken> {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);

        self.users
            .store_access_token(user_id, name, &hash_token(&token))
            .await?;

        Ok(AuthToken::bearer(token))
    }

    /// Resolve a presented bearer token to its user.
    pub async fn authenticate_token(&self, token: &str) -> Result<User> {
        self.users
            .find_user_by_token_hash(&hash_token(token))
            .await?
            .ok_or(CoreError::Unauthenticated)
    }

    /// Revoke every credential of the user, all kinds.
    pub async fn logout(&self, user_id: UserId) -> Result<()> {
        let revoked = self.users.delete_access_tokens(user_id).await?;
        info!(user_id = %user_id, revoked, "logged out");
        Ok(())
    }
}

/// SHA-256 of the token, base64url; only this ever reaches the database.
fn hash_token(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ports::users::MockUsersRepository;
    use chrono::Utc;

    fn user(id: i64) -> User {
        User {
            id: UserId::new(id),
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn argon2_hash(password: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn login_issues_auth_token_kind() {
        let mut users = MockUsersRepository::new();
        let hash = argon2_hash("hunter2hunter2");
        users
            .expect_find_by_email()
            .withf(|email| email == "ana@example.com")
            .return_once(move |_| Ok(Some((user(1), hash))));
        users
            .expect_store_access_token()
            .withf(|uid, name, token_hash| {
                uid.value() == 1 && name == AUTH_TOKEN && !token_hash.is_empty()
            })
            .return_once(|_, _, _| Ok(()));

        let service = AuthService::new(Arc::new(users));
        let (user, token) = service
            .login(LoginRequest {
                email: "Ana@Example.com".to_string(),
                password: "hunter2hunter2".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(user.id.value(), 1);
        assert_eq!(token.token_type, "Bearer");
        assert!(!token.token.is_empty());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let mut users = MockUsersRepository::new();
        let hash = argon2_hash("the-right-password");
        users
            .expect_find_by_email()
            .withf(|email| email == "ana@example.com")
            .return_once(move |_| Ok(Some((user(1), hash))));
        users
            .expect_find_by_email()
            .withf(|email| email == "nobody@example.com")
            .return_once(|_| Ok(None));

        let service = AuthService::new(Arc::new(users));

        let bad_password = service
            .login(LoginRequest {
                email: "ana@example.com".to_string(),
                password: "the-wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_email = service
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "whatever-password".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(bad_password, CoreError::InvalidCredentials));
        assert!(matches!(unknown_email, CoreError::InvalidCredentials));
    }

    #[tokio::test]
    async fn authenticate_token_looks_up_by_hash() {
        let mut users = MockUsersRepository::new();
        let expected_hash = hash_token("the-token");
        users
            .expect_find_user_by_token_hash()
            .withf(move |hash| hash == expected_hash)
            .return_once(|_| Ok(Some(user(7))));

        let service = AuthService::new(Arc::new(users));
        let user = service.authenticate_token("the-token").await.unwrap();
        assert_eq!(user.id.value(), 7);
    }

    #[tokio::test]
    async fn unknown_token_is_unauthenticated() {
        let mut users = MockUsersRepository::new();
        users
            .expect_find_user_by_token_hash()
            .return_once(|_| Ok(None));

        let service = AuthService::new(Arc::new(users));
        let err = service.authenticate_token("forged").await.unwrap_err();
        assert!(matches!(err, CoreError::Unauthenticated));
    }

    #[tokio::test]
    async fn register_rejects_invalid_payloads_before_persisting() {
        let users = MockUsersRepository::new();
        let service = AuthService::new(Arc::new(users));

        let err = service
            .register(RegisterRequest {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                password: "short".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Validation(_)));
    }
}
