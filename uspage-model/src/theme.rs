//! Themes: the visual presets landings are built from.
//!
//! A theme with `user_id == None` is a system theme: globally visible,
//! never modifiable or deletable by end users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;
use crate::ids::{MediaId, ThemeId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub id: ThemeId,
    /// `None` marks a system theme.
    pub user_id: Option<UserId>,
    pub name: String,
    pub description: Option<String>,
    /// Hex `#RRGGBB`.
    pub primary_color: String,
    pub secondary_color: String,
    pub bg_color: String,
    /// Weak reference to the background [`crate::Media`]; the theme owns
    /// the media's lifecycle, not the other way around.
    pub bg_image_media_id: Option<MediaId>,
    pub bg_image_url: Option<String>,
    pub css_class: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Theme {
    pub fn is_system(&self) -> bool {
        self.user_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateThemeRequest {
    pub name: String,
    pub description: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub bg_color: String,
    pub css_class: String,
    /// Reference an already-uploaded media item as the background.
    pub bg_image_media_id: Option<MediaId>,
}

impl CreateThemeRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        if self.name.len() > 100 {
            return Err(ValidationError::TooLong {
                field: "name",
                max: 100,
            });
        }
        if self.css_class.len() > 100 {
            return Err(ValidationError::TooLong {
                field: "css_class",
                max: 100,
            });
        }
        for color in [
            &self.primary_color,
            &self.secondary_color,
            &self.bg_color,
        ] {
            validate_hex_color(color)?;
        }
        Ok(())
    }
}

/// Theme update payload.
///
/// `bg_image_media_id` is tri-state: absent leaves the background
/// untouched, explicit `null` clears it (force-deleting the old media),
/// and an id replaces it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateThemeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub bg_color: Option<String>,
    pub css_class: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub bg_image_media_id: Option<Option<MediaId>>,
}

impl UpdateThemeRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::Empty { field: "name" });
            }
            if name.len() > 100 {
                return Err(ValidationError::TooLong {
                    field: "name",
                    max: 100,
                });
            }
        }
        if let Some(css_class) = &self.css_class
            && css_class.len() > 100
        {
            return Err(ValidationError::TooLong {
                field: "css_class",
                max: 100,
            });
        }
        for color in [
            &self.primary_color,
            &self.secondary_color,
            &self.bg_color,
        ]
        .into_iter()
        .flatten()
        {
            validate_hex_color(color)?;
        }
        Ok(())
    }
}

fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    let rest = color
        .strip_prefix('#')
        .ok_or(ValidationError::InvalidColor)?;
    if rest.len() != 6 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidColor);
    }
    Ok(())
}

/// Distinguishes a field that is present-but-null from one that is absent.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
