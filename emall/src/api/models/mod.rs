//! API request and response data models.
//!
//! These models define the public API contract. They are distinct from the
//! database models so storage and API representations can evolve
//! independently, and every one of them carries `utoipa` annotations for the
//! generated OpenAPI document.
//!
//! Required-field validation happens here (`into_db_request`), so a missing
//! field comes back as a 400 naming the field instead of a decode error.

pub mod auth;
pub mod events;
pub mod gallery;
pub mod rooms;
pub mod stats;
pub mod uploads;
pub mod users;
