use thiserror::Error;

/// Error taxonomy of the domain services.
///
/// `NotFound` and `Forbidden` are deliberately distinct: an entity that
/// does not exist and an entity the caller does not own must be
/// distinguishable, even where a public flow later collapses both into
/// the same client-facing code.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity absent — or, on public slug lookups, absent-or-unpublished.
    #[error("not found")]
    NotFound,

    /// Ownership mismatch on an existing entity.
    #[error("forbidden")]
    Forbidden,

    /// Malformed input, slug collision, cross-user media reference, or a
    /// limit violation.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid bearer credential.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Unknown email or wrong password; callers must not learn which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Unique-constraint race loser (e.g. duplicate email on register).
    #[error("{0}")]
    Conflict(String),

    /// Blob storage failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Database failure.
    #[error("database error: {0}")]
    Database(String),

    /// Anything else that should surface as a 500.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn database(err: impl std::fmt::Display) -> Self {
        Self::Database(err.to_string())
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<uspage_model::ValidationError> for CoreError {
    fn from(err: uspage_model::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
