//! User accounts and authentication payloads.
//!
//! Passwords travel as plain text only inside the login/register request
//! bodies; the stored Argon2id hash lives in its own column and is never
//! part of the serialized [`User`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::UserId;

/// A registered account.
///
/// The password hash is deliberately not a field here: repositories
/// return it separately so it can never leak through a response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique, stored lowercase.
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Bearer credential returned by login, register and token creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    /// Opaque secret; only its SHA-256 hash is persisted.
    pub token: String,
    pub token_type: String,
}

impl AuthToken {
    pub fn bearer(token: String) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
        }
    }
}

/// Login request payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    /// Plain text password, verified against the stored hash.
    pub password: String,
}

/// Registration request payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() || self.name.len() > 100 {
            return Err(ValidationError::InvalidName);
        }

        // Minimal shape check; the unique index is the real gatekeeper.
        let mut parts = self.email.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(ValidationError::InvalidEmail);
        }

        if self.password.len() < 8 {
            return Err(ValidationError::PasswordTooShort);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "correct-horse".to_string(),
        }
    }

    #[test]
    fn accepts_well_formed_registration() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn rejects_malformed_email() {
        let mut req = request();
        req.email = "not-an-email".to_string();
        assert!(matches!(
            req.validate(),
            Err(ValidationError::InvalidEmail)
        ));
    }

    #[test]
    fn rejects_short_password() {
        let mut req = request();
        req.password = "short".to_string();
        assert!(matches!(
            req.validate(),
            Err(ValidationError::PasswordTooShort)
        ));
    }
}
