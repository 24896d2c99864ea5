//! Database models for gallery items.

use crate::types::GalleryItemId;
use chrono::{DateTime, Utc};

/// Database request for creating a gallery item
#[derive(Debug, Clone)]
pub struct GalleryItemCreateDBRequest {
    pub title: String,
    pub category: Option<String>,
    pub image_url: String,
    pub cloudinary_id: Option<String>,
    pub is_visible: bool,
}

/// Database request for updating a gallery item
#[derive(Debug, Clone, Default)]
pub struct GalleryItemUpdateDBRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub cloudinary_id: Option<String>,
    pub is_visible: Option<bool>,
}

/// Database response for a gallery item
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GalleryItemDBResponse {
    pub id: GalleryItemId,
    pub title: String,
    pub category: Option<String>,
    pub image_url: String,
    pub cloudinary_id: Option<String>,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}

/// Aggregate gallery counts
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GalleryStatsDBResponse {
    pub total: i64,
    pub visible: i64,
    pub hidden: i64,
}
