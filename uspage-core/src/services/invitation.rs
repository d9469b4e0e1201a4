//! Invitation lifecycle: CRUD, public slug lookup, media linkage.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::database::ports::invitations::{
    InvitationChanges, InvitationsRepository, NewInvitation,
};
use crate::error::{CoreError, Result};
use crate::services::media::MediaService;
use uspage_model::invitation::{DEFAULT_TITLE, DEFAULT_YES_MESSAGE, default_no_messages};
use uspage_model::{
    CreateInvitationRequest, Invitation, InvitationId, Media, MediaId,
    UpdateInvitationRequest, UserId, slugify,
};

/// An invitation holds at most this many linked media items.
pub const MAX_MEDIA_PER_INVITATION: i64 = 20;

pub struct InvitationService {
    invitations: Arc<dyn InvitationsRepository>,
    media: Arc<MediaService>,
}

impl fmt::Debug for InvitationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvitationService").finish_non_exhaustive()
    }
}

impl InvitationService {
    pub fn new(
        invitations: Arc<dyn InvitationsRepository>,
        media: Arc<MediaService>,
    ) -> Self {
        Self { invitations, media }
    }

    /// The user's invitations, soft-deleted included.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Invitation>> {
        self.invitations.list_for_user(user_id).await
    }

    pub async fn create(
        &self,
        user_id: UserId,
        request: CreateInvitationRequest,
    ) -> Result<Invitation> {
        request.validate()?;

        let title = request
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let slug = match request.slug.filter(|s| !s.is_empty()) {
            Some(slug) => {
                if !self.invitations.slug_available(user_id, &slug, None).await? {
                    return Err(CoreError::validation(
                        "Slug already in use for this user",
                    ));
                }
                slug
            }
            None => self.generate_unique_slug(&title, user_id).await?,
        };

        let no_messages = request
            .no_messages
            .filter(|m| !m.is_empty())
            .unwrap_or_else(default_no_messages);

        let invitation = self
            .invitations
            .create(NewInvitation {
                user_id,
                slug,
                title,
                yes_message: request
                    .yes_message
                    .unwrap_or_else(|| DEFAULT_YES_MESSAGE.to_string()),
                no_messages,
                is_published: request.is_published.unwrap_or(false),
            })
            .await
            .map_err(conflict_to_validation)?;

        info!(invitation_id = %invitation.id, slug = %invitation.slug, "created invitation");
        Ok(invitation)
    }

    pub async fn update(
        &self,
        id: InvitationId,
        request: UpdateInvitationRequest,
        user_id: UserId,
    ) -> Result<Invitation> {
        let invitation = self
            .invitations
            .find_by_id_with_deleted(id)
            .await?
            .ok_or(CoreError::NotFound)?;
        if invitation.user_id != user_id {
            return Err(CoreError::Forbidden);
        }
        request.validate()?;

        if let Some(slug) = &request.slug
            && *slug != invitation.slug
            && !self.invitations.slug_available(user_id, slug, Some(id)).await?
        {
            return Err(CoreError::validation("Slug already in use for this user"));
        }

        self.invitations
            .update(
                id,
                InvitationChanges {
                    title: request.title,
                    slug: request.slug,
                    yes_message: request.yes_message,
                    no_messages: request.no_messages,
                    is_published: request.is_published,
                },
            )
            .await
            .map_err(conflict_to_validation)
    }

    /// Soft delete; the slug stays reserved while the row exists.
    pub async fn delete(&self, id: InvitationId, user_id: UserId) -> Result<()> {
        let invitation = self
            .invitations
            .find_by_id(id)
            .await?
            .ok_or(CoreError::NotFound)?;
        if invitation.user_id != user_id {
            return Err(CoreError::Forbidden);
        }

        self.invitations.soft_delete(id).await?;
        Ok(())
    }

    /// Anonymous path: published, live invitations only. Everything else
    /// is `NotFound` — private and absent are indistinguishable here.
    pub async fn find_public_by_slug(&self, slug: &str) -> Result<Invitation> {
        self.invitations
            .find_published_by_slug(slug)
            .await?
            .ok_or(CoreError::NotFound)
    }

    /// Owner path: numeric id, ownership enforced.
    pub async fn find_for_user(
        &self,
        id: InvitationId,
        user_id: UserId,
    ) -> Result<Invitation> {
        let invitation = self
            .invitations
            .find_by_id(id)
            .await?
            .ok_or(CoreError::NotFound)?;
        if invitation.user_id != user_id {
            return Err(CoreError::Forbidden);
        }
        Ok(invitation)
    }

    /// Linked media in attach order.
    pub async fn media(&self, id: InvitationId) -> Result<Vec<Media>> {
        self.invitations.list_media(id).await
    }

    /// Link a media item, idempotently, under the 20-item limit.
    pub async fn attach_media(
        &self,
        invitation_id: InvitationId,
        media_id: MediaId,
        user_id: UserId,
    ) -> Result<()> {
        let invitation = self
            .invitations
            .find_by_id(invitation_id)
            .await?
            .ok_or(CoreError::NotFound)?;
        if invitation.user_id != user_id {
            return Err(CoreError::Forbidden);
        }

        self.media.find_owned(media_id, user_id).await?;

        if self.invitations.count_media(invitation_id).await? >= MAX_MEDIA_PER_INVITATION
        {
            return Err(CoreError::validation(
                "Media limit reached for this invitation",
            ));
        }

        self.invitations.attach_media(invitation_id, media_id).await
    }

    /// Unlink a media item; detaching a non-linked media is a no-op.
    pub async fn detach_media(
        &self,
        invitation_id: InvitationId,
        media_id: MediaId,
        user_id: UserId,
    ) -> Result<()> {
        let invitation = self
            .invitations
            .find_by_id(invitation_id)
            .await?
            .ok_or(CoreError::NotFound)?;
        if invitation.user_id != user_id {
            return Err(CoreError::Forbidden);
        }

        self.invitations.detach_media(invitation_id, media_id).await
    }

    /// Advisory slug derivation: slugify, then bump a counter until free.
    /// The unique index still has the final word under races.
    async fn generate_unique_slug(&self, base: &str, user_id: UserId) -> Result<String> {
        let base = match slugify(base) {
            s if s.is_empty() => "invitation".to_string(),
            s => s,
        };

        let mut candidate = base.clone();
        let mut counter = 1u32;
        while !self
            .invitations
            .slug_available(user_id, &candidate, None)
            .await?
        {
            candidate = format!("{base}-{counter}");
            counter += 1;
        }
        Ok(candidate)
    }
}

/// The constraint-violation race loser surfaces exactly like the advisory
/// check: a validation failure.
fn conflict_to_validation(err: CoreError) -> CoreError {
    match err {
        CoreError::Conflict(message) => CoreError::Validation(message),
        other => other,
    }
}
