//! API request/response models for rooms.

use crate::db::models::rooms::{
    RoomCreateDBRequest, RoomDBResponse, RoomImageDBRequest, RoomImageDBResponse, RoomStatsDBResponse, RoomUpdateDBRequest,
};
use crate::errors::{Error, Result};
use crate::types::{RoomId, RoomImageId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};
use utoipa::{IntoParams, ToSchema};

/// Occupancy status of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "room_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Vacant,
    Rented,
}

/// Rent arrives from the admin form either as a JSON number or a numeric
/// string; accept both.
fn deserialize_rent<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(serde_json::Number),
        Text(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => n.to_string().parse().map(Some).map_err(de::Error::custom),
        Some(NumberOrString::Text(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
    }
}

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

/// Image reference submitted with a room
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomImagePayload {
    pub image_url: String,
    pub cloudinary_id: Option<String>,
}

impl From<RoomImagePayload> for RoomImageDBRequest {
    fn from(payload: RoomImagePayload) -> Self {
        Self {
            image_url: payload.image_url,
            cloudinary_id: payload.cloudinary_id,
        }
    }
}

/// Request body for creating a room. Required fields are validated here so
/// a missing one yields a 400 naming the field rather than a decode error.
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
pub struct RoomCreate {
    pub room_number: Option<String>,
    pub title: Option<String>,
    pub block: Option<String>,
    pub floor: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_rent")]
    #[schema(value_type = Option<f64>)]
    pub rent: Option<Decimal>,
    pub status: Option<RoomStatus>,
    pub description: Option<String>,
    pub images: Option<Vec<RoomImagePayload>>,
}

impl RoomCreate {
    pub fn into_db_request(self) -> Result<RoomCreateDBRequest> {
        Ok(RoomCreateDBRequest {
            room_number: require_text(self.room_number, "room_number")?,
            title: require_text(self.title, "title")?,
            block: require_text(self.block, "block")?,
            floor: self.floor,
            category: require_text(self.category, "category")?,
            rent: self.rent.ok_or_else(|| missing("rent"))?,
            status: self.status.unwrap_or(RoomStatus::Vacant),
            description: self.description,
            images: self.images.unwrap_or_default().into_iter().map(Into::into).collect(),
        })
    }
}

/// Request body for updating a room. All fields are optional; a present
/// `images` array replaces the stored set wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
pub struct RoomUpdate {
    pub room_number: Option<String>,
    pub title: Option<String>,
    pub block: Option<String>,
    pub floor: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_rent")]
    #[schema(value_type = Option<f64>)]
    pub rent: Option<Decimal>,
    pub status: Option<RoomStatus>,
    pub description: Option<String>,
    pub images: Option<Vec<RoomImagePayload>>,
}

impl From<RoomUpdate> for RoomUpdateDBRequest {
    fn from(api: RoomUpdate) -> Self {
        Self {
            room_number: api.room_number,
            title: api.title,
            block: api.block,
            floor: api.floor,
            category: api.category,
            rent: api.rent,
            status: api.status,
            description: api.description,
            images: api.images.map(|images| images.into_iter().map(Into::into).collect()),
        }
    }
}

/// Query parameters for listing rooms
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct RoomsQuery {
    /// Status filter; ignored for public requests, which only see vacant rooms
    pub status: Option<RoomStatus>,
    /// When true, requires a session and returns the unfiltered catalogue
    pub admin: Option<bool>,
}

/// Room image returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomImageResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: RoomImageId,
    pub image_url: String,
    pub cloudinary_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<RoomImageDBResponse> for RoomImageResponse {
    fn from(db: RoomImageDBResponse) -> Self {
        Self {
            id: db.id,
            image_url: db.image_url,
            cloudinary_id: db.cloudinary_id,
            created_at: db.created_at,
        }
    }
}

/// Full room details returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: RoomId,
    pub room_number: String,
    pub title: String,
    pub block: String,
    pub floor: Option<String>,
    pub category: String,
    #[schema(value_type = String, example = "1500.00")]
    pub rent: Decimal,
    pub status: RoomStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub images: Vec<RoomImageResponse>,
}

impl From<RoomDBResponse> for RoomResponse {
    fn from(db: RoomDBResponse) -> Self {
        Self {
            id: db.id,
            room_number: db.room_number,
            title: db.title,
            block: db.block,
            floor: db.floor,
            category: db.category,
            rent: db.rent,
            status: db.status,
            description: db.description,
            created_at: db.created_at,
            images: db.images.into_iter().map(Into::into).collect(),
        }
    }
}

/// Room counts for the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatsResponse {
    pub total_rooms: i64,
    pub vacant_rooms: i64,
    pub rented_rooms: i64,
    pub business_centre_rooms: i64,
}

impl From<RoomStatsDBResponse> for RoomStatsResponse {
    fn from(db: RoomStatsDBResponse) -> Self {
        Self {
            total_rooms: db.total,
            vacant_rooms: db.vacant,
            rented_rooms: db.rented,
            business_centre_rooms: db.business_centre,
        }
    }
}
