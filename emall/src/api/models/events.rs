//! API request/response models for events.

use crate::db::models::events::{EventCreateDBRequest, EventDBResponse, EventImageDBRequest, EventImageDBResponse, EventUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{EventId, EventImageId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Lifecycle status of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
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

/// Image submitted with an event create/update, as uploaded through the
/// relay endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventImagePayload {
    pub image_url: String,
    pub cloudinary_id: Option<String>,
}

impl From<EventImagePayload> for EventImageDBRequest {
    fn from(api: EventImagePayload) -> Self {
        Self {
            image_url: api.image_url,
            cloudinary_id: api.cloudinary_id,
        }
    }
}

/// Request body for creating an event. The slug is derived from the title
/// server-side; images keep their submitted order.
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
pub struct EventCreate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub status: Option<EventStatus>,
    pub display_order: Option<i32>,
    pub images: Option<Vec<EventImagePayload>>,
}

impl EventCreate {
    pub fn into_db_request(self) -> Result<EventCreateDBRequest> {
        Ok(EventCreateDBRequest {
            title: require_text(self.title, "title")?,
            description: require_text(self.description, "description")?,
            event_date: self.event_date,
            status: self.status.unwrap_or(EventStatus::Draft),
            display_order: self.display_order.unwrap_or(0),
            images: self.images.unwrap_or_default().into_iter().map(Into::into).collect(),
        })
    }
}

/// Request body for updating an event. A new `title` also regenerates the
/// slug; a present `images` array replaces the stored set wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub status: Option<EventStatus>,
    pub display_order: Option<i32>,
    pub images: Option<Vec<EventImagePayload>>,
}

impl From<EventUpdate> for EventUpdateDBRequest {
    fn from(api: EventUpdate) -> Self {
        Self {
            title: api.title,
            description: api.description,
            event_date: api.event_date,
            status: api.status,
            display_order: api.display_order,
            images: api.images.map(|images| images.into_iter().map(Into::into).collect()),
        }
    }
}

/// Query parameters for listing events
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct EventsQuery {
    /// Status filter; ignored for public requests, which only see published events
    pub status: Option<EventStatus>,
    /// When true, requires a session and honours the status filter as given
    pub admin: Option<bool>,
}

/// Event image returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventImageResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: EventImageId,
    pub image_url: String,
    pub cloudinary_id: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<EventImageDBResponse> for EventImageResponse {
    fn from(db: EventImageDBResponse) -> Self {
        Self {
            id: db.id,
            image_url: db.image_url,
            cloudinary_id: db.cloudinary_id,
            display_order: db.display_order,
            created_at: db.created_at,
        }
    }
}

/// Full event details returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: EventId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub event_date: Option<NaiveDate>,
    pub status: EventStatus,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub images: Vec<EventImageResponse>,
}

impl From<EventDBResponse> for EventResponse {
    fn from(db: EventDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            slug: db.slug,
            description: db.description,
            event_date: db.event_date,
            status: db.status,
            display_order: db.display_order,
            created_at: db.created_at,
            updated_at: db.updated_at,
            images: db.images.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_title_and_description() {
        let no_title: EventCreate = serde_json::from_value(serde_json::json!({"description": "d"})).unwrap();
        let err = no_title.into_db_request().unwrap_err();
        assert!(matches!(err, Error::BadRequest { ref message } if message == "Missing required field: title"));

        let no_description: EventCreate = serde_json::from_value(serde_json::json!({"title": "t"})).unwrap();
        let err = no_description.into_db_request().unwrap_err();
        assert!(matches!(err, Error::BadRequest { ref message } if message == "Missing required field: description"));
    }

    #[test]
    fn create_defaults_to_draft_with_order_zero() {
        let request: EventCreate = serde_json::from_value(serde_json::json!({
            "title": "Night Market",
            "description": "Food and music"
        }))
        .unwrap();

        let db_request = request.into_db_request().unwrap();
        assert_eq!(db_request.status, EventStatus::Draft);
        assert_eq!(db_request.display_order, 0);
    }

    #[test]
    fn images_accept_url_and_cloudinary_id_pairs() {
        let request: EventCreate = serde_json::from_value(serde_json::json!({
            "title": "Night Market",
            "description": "Food and music",
            "images": [
                { "image_url": "https://cdn.example.com/1.jpg", "cloudinary_id": "emall/events/1" },
                { "image_url": "https://cdn.example.com/2.jpg" }
            ]
        }))
        .unwrap();

        let db_request = request.into_db_request().unwrap();
        assert_eq!(db_request.images.len(), 2);
        assert_eq!(db_request.images[0].cloudinary_id.as_deref(), Some("emall/events/1"));
        assert_eq!(db_request.images[1].cloudinary_id, None);
    }

    #[test]
    fn event_date_parses_iso_dates() {
        let request: EventCreate = serde_json::from_value(serde_json::json!({
            "title": "Night Market",
            "description": "Food and music",
            "event_date": "2026-09-12"
        }))
        .unwrap();
        assert_eq!(request.event_date, Some(NaiveDate::from_ymd_opt(2026, 9, 12).unwrap()));
    }
}
