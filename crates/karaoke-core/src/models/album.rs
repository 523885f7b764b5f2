use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ids::AlbumId;
use super::video::{timestamp, Video};

/// Album projection as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Videos embedded by some endpoints. Empty when the server omits them. Legacy `media`
    /// entries carry no album id and are not read; use `GET /albums/{id}/videos` instead.
    #[serde(default)]
    pub videos: Vec<Video>,
}

/// Request DTO for creating a new album
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateAlbumRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Album name must be between 1 and 255 characters"
    ))]
    pub name: String,
    pub user_id: i64,
}

impl CreateAlbumRequest {
    /// Trims the name and validates the request.
    pub fn new(name: &str, user_id: i64) -> Result<Self, crate::AppError> {
        let request = Self {
            name: name.trim().to_string(),
            user_id,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Request DTO for updating an album. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateAlbumRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(
        min = 1,
        max = 255,
        message = "Album name must be between 1 and 255 characters"
    ))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateAlbumRequest {
    pub fn rename(name: &str) -> Result<Self, crate::AppError> {
        let request = Self {
            name: Some(name.trim().to_string()),
            description: None,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn describe(description: &str) -> Self {
        Self {
            name: None,
            description: Some(description.to_string()),
        }
    }
}
