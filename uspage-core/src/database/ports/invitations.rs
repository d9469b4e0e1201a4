use async_trait::async_trait;

use crate::error::Result;
use uspage_model::{Invitation, InvitationId, Media, MediaId, UserId};

/// Insert payload for an invitation; defaults already applied.
#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub user_id: UserId,
    pub slug: String,
    pub title: String,
    pub yes_message: String,
    pub no_messages: Vec<String>,
    pub is_published: bool,
}

/// Scalar updates; `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct InvitationChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub yes_message: Option<String>,
    pub no_messages: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvitationsRepository: Send + Sync {
    /// The user's invitations, soft-deleted included, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Invitation>>;

    async fn find_by_id(&self, id: InvitationId) -> Result<Option<Invitation>>;

    async fn find_by_id_with_deleted(
        &self,
        id: InvitationId,
    ) -> Result<Option<Invitation>>;

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Invitation>>;

    async fn create(&self, invitation: NewInvitation) -> Result<Invitation>;

    async fn update(
        &self,
        id: InvitationId,
        changes: InvitationChanges,
    ) -> Result<Invitation>;

    async fn soft_delete(&self, id: InvitationId) -> Result<bool>;

    async fn slug_available(
        &self,
        user_id: UserId,
        slug: &str,
        exclude: Option<InvitationId>,
    ) -> Result<bool>;

    /// Idempotent: an existing join row is left untouched.
    async fn attach_media(
        &self,
        invitation_id: InvitationId,
        media_id: MediaId,
    ) -> Result<()>;

    /// Idempotent: detaching a non-linked media is a no-op.
    async fn detach_media(
        &self,
        invitation_id: InvitationId,
        media_id: MediaId,
    ) -> Result<()>;

    async fn count_media(&self, invitation_id: InvitationId) -> Result<i64>;

    /// Linked media in attach order.
    async fn list_media(&self, invitation_id: InvitationId) -> Result<Vec<Media>>;
}
