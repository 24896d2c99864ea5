//! API response models for the admin dashboard stats.

use crate::db::models::{events::EventStatsDBResponse, gallery::GalleryStatsDBResponse, rooms::RoomStatsDBResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Room counts, keyed the way the dashboard widgets expect
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomCounts {
    pub total: i64,
    pub vacant: i64,
    pub rented: i64,
    pub business_centre: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventCounts {
    pub total: i64,
    pub published: i64,
    pub draft: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GalleryCounts {
    pub total: i64,
    pub visible: i64,
    pub hidden: i64,
}

/// Aggregate counts across the whole catalogue
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminStatsResponse {
    pub rooms: RoomCounts,
    pub events: EventCounts,
    pub gallery: GalleryCounts,
}

impl From<RoomStatsDBResponse> for RoomCounts {
    fn from(db: RoomStatsDBResponse) -> Self {
        Self {
            total: db.total,
            vacant: db.vacant,
            rented: db.rented,
            business_centre: db.business_centre,
        }
    }
}

impl From<EventStatsDBResponse> for EventCounts {
    fn from(db: EventStatsDBResponse) -> Self {
        Self {
            total: db.total,
            published: db.published,
            draft: db.draft,
        }
    }
}

impl From<GalleryStatsDBResponse> for GalleryCounts {
    fn from(db: GalleryStatsDBResponse) -> Self {
        Self {
            total: db.total,
            visible: db.visible,
            hidden: db.hidden,
        }
    }
}
