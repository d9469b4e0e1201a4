//! Uploaded media items and the references that keep them alive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{InvitationId, LandingId, MediaId, ThemeId, UserId};

/// An uploaded file: blob in the storage backend, row in the database.
///
/// Media is shared by reference from themes (background image), landings
/// and invitations; it is never copied per entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub id: MediaId,
    pub user_id: UserId,
    /// Original client-supplied file name.
    pub filename: String,
    /// Storage key under the blob backend.
    pub path: String,
    /// Public URL derived from the storage backend.
    pub url: String,
    pub mime_type: String,
    /// Size in bytes.
    pub size: i64,
    pub created_at: DateTime<Utc>,
}

/// One live reference to a media row.
///
/// The in-use guard resolves all three reference kinds through a single
/// query, so "is this media referenced anywhere" is one function over one
/// result set rather than three existence checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaReference {
    ThemeBackground {
        theme_id: ThemeId,
    },
    LandingSlot {
        landing_id: LandingId,
        sort_order: i32,
    },
    InvitationSlot {
        invitation_id: InvitationId,
    },
}

/// An incoming upload, assembled from a multipart request body.
#[derive(Clone, Serialize, Deserialize)]
pub struct MediaUpload {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for MediaUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaUpload")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl MediaUpload {
    /// File extension taken from the client file name, lowercased.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.filename.rsplit_once('.')?;
        if ext.is_empty() || ext.contains('/') {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}
