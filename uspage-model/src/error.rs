use thiserror::Error;

/// Validation errors for user-supplied payloads.
///
/// Raised by the `validate()` methods on request types before a payload is
/// handed to a service. Each variant carries enough context to surface as
/// a field-level message.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password too short: minimum 8 characters required")]
    PasswordTooShort,

    #[error("Invalid name: must be 1-100 characters")]
    InvalidName,

    #[error("Invalid slug: lowercase letters, digits and hyphens only, max 50 characters")]
    InvalidSlug,

    #[error("Invalid color: expected hex format #RRGGBB")]
    InvalidColor,

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}
