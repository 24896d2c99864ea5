//! OpenAPI documentation for the mall API.
//!
//! The generated spec is served at `/api/v1/openapi.json` with an
//! interactive browser at `/admin/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api;

/// Session cookie security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "CookieAuth".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("emall_session"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::me,
        api::handlers::rooms::list_rooms,
        api::handlers::rooms::room_stats,
        api::handlers::rooms::get_room,
        api::handlers::rooms::create_room,
        api::handlers::rooms::update_room,
        api::handlers::rooms::delete_room,
        api::handlers::events::list_events,
        api::handlers::events::get_event_by_slug,
        api::handlers::events::get_event,
        api::handlers::events::create_event,
        api::handlers::events::update_event,
        api::handlers::events::delete_event,
        api::handlers::gallery::list_gallery,
        api::handlers::gallery::create_gallery_item,
        api::handlers::gallery::update_gallery_item,
        api::handlers::gallery::delete_gallery_item,
        api::handlers::uploads::upload_image,
        api::handlers::stats::admin_stats,
    ),
    components(
        schemas(
            api::models::auth::LoginRequest,
            api::models::auth::AuthResponse,
            api::models::auth::AuthSuccessResponse,
            api::models::users::UserResponse,
            api::models::users::CurrentUser,
            api::models::rooms::RoomStatus,
            api::models::rooms::RoomCreate,
            api::models::rooms::RoomUpdate,
            api::models::rooms::RoomImageResponse,
            api::models::rooms::RoomResponse,
            api::models::rooms::RoomStatsResponse,
            api::models::events::EventStatus,
            api::models::events::EventCreate,
            api::models::events::EventUpdate,
            api::models::events::EventImagePayload,
            api::models::events::EventImageResponse,
            api::models::events::EventResponse,
            api::models::gallery::GalleryItemCreate,
            api::models::gallery::GalleryItemUpdate,
            api::models::gallery::GalleryItemResponse,
            api::models::uploads::UploadResponse,
            api::models::stats::RoomCounts,
            api::models::stats::EventCounts,
            api::models::stats::GalleryCounts,
            api::models::stats::AdminStatsResponse,
        )
    ),
    tags(
        (name = "authentication", description = "Admin session login, logout, and introspection."),
        (name = "rooms", description = "Rentable units across the mall's blocks, with images and occupancy status."),
        (name = "events", description = "Mall events with draft/published workflow and slug-based public URLs."),
        (name = "gallery", description = "Photo gallery with per-item visibility."),
        (name = "uploads", description = "Server-side relay to the image CDN."),
        (name = "stats", description = "Aggregate counts for the admin dashboard."),
    ),
    info(
        title = "Emall API",
        description = "Backend for the mall marketing site and its admin back office.

Public routes serve the marketing frontend; everything that writes, and every
listing with `admin=true`, requires a session cookie obtained via
`/authentication/login`.",
    ),
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_builds_and_covers_the_main_surfaces() {
        let spec = ApiDoc::openapi();

        let paths: Vec<_> = spec.paths.paths.keys().cloned().collect();
        assert!(paths.contains(&"/authentication/login".to_string()));
        assert!(paths.contains(&"/rooms".to_string()));
        assert!(paths.contains(&"/events/slug/{slug}".to_string()));
        assert!(paths.contains(&"/gallery".to_string()));
        assert!(paths.contains(&"/upload".to_string()));
        assert!(paths.contains(&"/admin/stats".to_string()));

        // Serializes cleanly
        let json = spec.to_json().unwrap();
        assert!(json.contains("Emall API"));
    }
}
