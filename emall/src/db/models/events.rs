//! Database models for events and their ordered images.

use crate::api::models::events::EventStatus;
use crate::types::{EventId, EventImageId};
use chrono::{DateTime, NaiveDate, Utc};

/// Image attached to an event create/update request
#[derive(Debug, Clone)]
pub struct EventImageDBRequest {
    pub image_url: String,
    pub cloudinary_id: Option<String>,
}

/// Database request for creating a new event. The slug is derived from the
/// title inside the repository, where the collision check lives.
#[derive(Debug, Clone)]
pub struct EventCreateDBRequest {
    pub title: String,
    pub description: String,
    pub event_date: Option<NaiveDate>,
    pub status: EventStatus,
    pub display_order: i32,
    /// Images in display order
    pub images: Vec<EventImageDBRequest>,
}

/// Database request for updating an event. A new `title` regenerates the
/// slug; `images: Some(_)` replaces the whole image set.
#[derive(Debug, Clone, Default)]
pub struct EventUpdateDBRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub status: Option<EventStatus>,
    pub display_order: Option<i32>,
    pub images: Option<Vec<EventImageDBRequest>>,
}

/// Database response for an event image
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventImageDBResponse {
    pub id: EventImageId,
    pub event_id: EventId,
    pub image_url: String,
    pub cloudinary_id: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Database response for an event, images included
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventDBResponse {
    pub id: EventId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub event_date: Option<NaiveDate>,
    pub status: EventStatus,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub images: Vec<EventImageDBResponse>,
}

/// Aggregate event counts
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventStatsDBResponse {
    pub total: i64,
    pub published: i64,
    pub draft: i64,
}
