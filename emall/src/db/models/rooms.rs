//! Database models for rooms and their images.

use crate::api::models::rooms::RoomStatus;
use crate::types::{RoomId, RoomImageId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Image attached to a room create/update request
#[derive(Debug, Clone)]
pub struct RoomImageDBRequest {
    pub image_url: String,
    pub cloudinary_id: Option<String>,
}

/// Database request for creating a new room
#[derive(Debug, Clone)]
pub struct RoomCreateDBRequest {
    pub room_number: String,
    pub title: String,
    pub block: String,
    pub floor: Option<String>,
    pub category: String,
    pub rent: Decimal,
    pub status: RoomStatus,
    pub description: Option<String>,
    pub images: Vec<RoomImageDBRequest>,
}

/// Database request for updating a room. `None` fields are left untouched;
/// `images: Some(_)` replaces the whole image set (including `Some(vec![])`).
#[derive(Debug, Clone, Default)]
pub struct RoomUpdateDBRequest {
    pub room_number: Option<String>,
    pub title: Option<String>,
    pub block: Option<String>,
    pub floor: Option<String>,
    pub category: Option<String>,
    pub rent: Option<Decimal>,
    pub status: Option<RoomStatus>,
    pub description: Option<String>,
    pub images: Option<Vec<RoomImageDBRequest>>,
}

/// Database response for a room image
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoomImageDBResponse {
    pub id: RoomImageId,
    pub room_id: RoomId,
    pub image_url: String,
    pub cloudinary_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database response for a room, images included
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoomDBResponse {
    pub id: RoomId,
    pub room_number: String,
    pub title: String,
    pub block: String,
    pub floor: Option<String>,
    pub category: String,
    pub rent: Decimal,
    pub status: RoomStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub images: Vec<RoomImageDBResponse>,
}

/// Aggregate room counts
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoomStatsDBResponse {
    pub total: i64,
    pub vacant: i64,
    pub rented: i64,
    pub business_centre: i64,
}
