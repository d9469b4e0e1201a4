//! Valentine-style yes/no invitations.
//!
//! Every field has a playful default so an invitation can be created from
//! an empty payload: the title, the yes button, and the escalating "no"
//! messages all come pre-filled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::{InvitationId, MediaId, UserId};
use crate::slug::is_valid_slug;

/// Default invitation title.
pub const DEFAULT_TITLE: &str = "¿Quieres ser mi San Valentín?";
/// Default label of the "yes" button.
pub const DEFAULT_YES_MESSAGE: &str = "Sí";

/// Default sequence of "no" button labels, shown in order as the visitor
/// keeps refusing.
pub fn default_no_messages() -> Vec<String> {
    ["No", "Tal vez", "No te arrepentirás", "Piénsalo mejor"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    pub id: InvitationId,
    pub user_id: UserId,
    pub slug: String,
    pub title: String,
    pub yes_message: String,
    pub no_messages: Vec<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Invitation {
    /// Whether the anonymous slug lookup may return this invitation.
    pub fn is_publicly_visible(&self) -> bool {
        self.is_published && self.deleted_at.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateInvitationRequest {
    /// Defaults to [`DEFAULT_TITLE`].
    pub title: Option<String>,
    /// Derived from the title when absent.
    pub slug: Option<String>,
    pub yes_message: Option<String>,
    pub no_messages: Option<Vec<String>>,
    /// Defaults to `false`; invitations start as drafts.
    pub is_published: Option<bool>,
}

impl CreateInvitationRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_texts(
            self.title.as_deref(),
            self.yes_message.as_deref(),
            self.no_messages.as_deref(),
        )?;
        if let Some(slug) = &self.slug
            && !is_valid_slug(slug)
        {
            return Err(ValidationError::InvalidSlug);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateInvitationRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub yes_message: Option<String>,
    pub no_messages: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

impl UpdateInvitationRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_texts(
            self.title.as_deref(),
            self.yes_message.as_deref(),
            self.no_messages.as_deref(),
        )?;
        if let Some(slug) = &self.slug
            && !is_valid_slug(slug)
        {
            return Err(ValidationError::InvalidSlug);
        }
        Ok(())
    }
}

fn validate_texts(
    title: Option<&str>,
    yes_message: Option<&str>,
    no_messages: Option<&[String]>,
) -> Result<(), ValidationError> {
    if let Some(title) = title {
        if title.trim().is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }
        if title.len() > 200 {
            return Err(ValidationError::TooLong {
                field: "title",
                max: 200,
            });
        }
    }
    if let Some(yes) = yes_message
        && yes.len() > 100
    {
        return Err(ValidationError::TooLong {
            field: "yes_message",
            max: 100,
        });
    }
    if let Some(messages) = no_messages {
        for message in messages {
            if message.len() > 100 {
                return Err(ValidationError::TooLong {
                    field: "no_messages",
                    max: 100,
                });
            }
        }
    }
    Ok(())
}

/// Attach one media item to an invitation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachInvitationMediaRequest {
    pub media_id: MediaId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slug::slugify;

    #[test]
    fn default_title_slugifies_to_expected_slug() {
        assert_eq!(slugify(DEFAULT_TITLE), "quieres-ser-mi-san-valentin");
    }

    #[test]
    fn default_no_messages_escalate_in_order() {
        assert_eq!(
            default_no_messages(),
            vec!["No", "Tal vez", "No te arrepentirás", "Piénsalo mejor"]
        );
    }

    #[test]
    fn empty_create_payload_is_valid() {
        let req: CreateInvitationRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_ok());
        assert!(req.title.is_none());
    }

    #[test]
    fn overlong_title_is_rejected() {
        let req = CreateInvitationRequest {
            title: Some("x".repeat(201)),
            ..Default::default()
        };
        assert!(matches!(
            req.validate(),
            Err(ValidationError::TooLong { field: "title", .. })
        ));
    }
}
