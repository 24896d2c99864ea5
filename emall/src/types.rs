//! Shared identifier aliases used across the API and DB layers.

use uuid::Uuid;

pub type UserId = Uuid;
pub type RoomId = Uuid;
pub type RoomImageId = Uuid;
pub type EventId = Uuid;
pub type EventImageId = Uuid;
pub type GalleryItemId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
