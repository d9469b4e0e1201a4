//! Couple landing pages.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::{LandingId, MediaId, ThemeId, UserId};
use crate::slug::is_valid_slug;

/// A personalized couple page, published under a per-user slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Landing {
    pub id: LandingId,
    pub user_id: UserId,
    pub theme_id: ThemeId,
    pub slug: String,
    pub couple_names: String,
    pub anniversary_date: NaiveDate,
    pub bio_text: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker; set rows are excluded from default queries.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Landing {
    /// Whether the anonymous slug lookup may return this landing.
    pub fn is_publicly_visible(&self) -> bool {
        self.is_published && self.deleted_at.is_none()
    }

    /// Whole years since the anniversary date.
    pub fn years_together(&self, today: NaiveDate) -> i32 {
        let mut years = today.year() - self.anniversary_date.year();
        if (today.month(), today.day())
            < (self.anniversary_date.month(), self.anniversary_date.day())
        {
            years -= 1;
        }
        years.max(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLandingRequest {
    pub couple_names: String,
    /// Derived from `couple_names` when absent.
    pub slug: Option<String>,
    pub anniversary_date: NaiveDate,
    pub theme_id: ThemeId,
    pub bio_text: Option<String>,
}

impl CreateLandingRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.couple_names.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "couple_names",
            });
        }
        if self.couple_names.len() > 200 {
            return Err(ValidationError::TooLong {
                field: "couple_names",
                max: 200,
            });
        }
        if let Some(slug) = &self.slug
            && !is_valid_slug(slug)
        {
            return Err(ValidationError::InvalidSlug);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLandingRequest {
    pub couple_names: Option<String>,
    pub slug: Option<String>,
    pub anniversary_date: Option<NaiveDate>,
    pub theme_id: Option<ThemeId>,
    pub bio_text: Option<String>,
    pub is_published: Option<bool>,
}

impl UpdateLandingRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(names) = &self.couple_names {
            if names.trim().is_empty() {
                return Err(ValidationError::Empty {
                    field: "couple_names",
                });
            }
            if names.len() > 200 {
                return Err(ValidationError::TooLong {
                    field: "couple_names",
                    max: 200,
                });
            }
        }
        if let Some(slug) = &self.slug
            && !is_valid_slug(slug)
        {
            return Err(ValidationError::InvalidSlug);
        }
        Ok(())
    }
}

/// Attach one media item to a landing's gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachLandingMediaRequest {
    pub media_id: MediaId,
    /// Defaults to one past the current maximum.
    pub sort_order: Option<i32>,
}

/// One `(media, position)` pair in a reorder request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaOrder {
    pub media_id: MediaId,
    pub sort_order: i32,
}

/// Batch re-position of a landing's gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderMediaRequest {
    pub orders: Vec<MediaOrder>,
}
