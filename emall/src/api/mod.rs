//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): Login, logout, current session
//! - **Rooms** (`/api/v1/rooms/*`): Rentable units with images and stats
//! - **Events** (`/api/v1/events/*`): Announcements with slugs and a
//!   draft/published lifecycle
//! - **Gallery** (`/api/v1/gallery/*`): Captioned images with a visibility toggle
//! - **Uploads** (`/api/v1/upload`): Signed relay to the image CDN
//! - **Admin stats** (`/api/v1/admin/stats`): Aggregate dashboard counts
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! The interactive docs are served at `/admin/docs`.

pub mod handlers;
pub mod models;
