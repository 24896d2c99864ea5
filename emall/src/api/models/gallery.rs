//! API request/response models for the gallery.

use crate::db::models::gallery::{GalleryItemCreateDBRequest, GalleryItemDBResponse, GalleryItemUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::GalleryItemId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

fn missing(field: &str) -> Error {
    Error::BadRequest {
        message: format!("Missing required field: {field}"),
    }
}

fn require_text(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(missing(field)),
    }
}

/// Request body for creating a gallery item
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
pub struct GalleryItemCreate {
    pub title: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub cloudinary_id: Option<String>,
    pub is_visible: Option<bool>,
}

impl GalleryItemCreate {
    pub fn into_db_request(self) -> Result<GalleryItemCreateDBRequest> {
        Ok(GalleryItemCreateDBRequest {
            title: require_text(self.title, "title")?,
            category: self.category,
            image_url: require_text(self.image_url, "image_url")?,
            cloudinary_id: self.cloudinary_id,
            is_visible: self.is_visible.unwrap_or(true),
        })
    }
}

/// Request body for updating a gallery item (incl. the visibility toggle)
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
pub struct GalleryItemUpdate {
    pub title: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub cloudinary_id: Option<String>,
    pub is_visible: Option<bool>,
}

impl From<GalleryItemUpdate> for GalleryItemUpdateDBRequest {
    fn from(api: GalleryItemUpdate) -> Self {
        Self {
            title: api.title,
            category: api.category,
            image_url: api.image_url,
            cloudinary_id: api.cloudinary_id,
            is_visible: api.is_visible,
        }
    }
}

/// Query parameters for listing gallery items
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct GalleryQuery {
    /// Category filter; "All" (or absent) means every category
    pub category: Option<String>,
    /// When true, requires a session and includes hidden items
    pub admin: Option<bool>,
}

/// Gallery item returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GalleryItemResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: GalleryItemId,
    pub title: String,
    pub category: Option<String>,
    pub image_url: String,
    pub cloudinary_id: Option<String>,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}

impl From<GalleryItemDBResponse> for GalleryItemResponse {
    fn from(db: GalleryItemDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            category: db.category,
            image_url: db.image_url,
            cloudinary_id: db.cloudinary_id,
            is_visible: db.is_visible,
            created_at: db.created_at,
        }
    }
}
