//! HTTP request handlers for all API endpoints.
//!
//! This module contains Axum route handlers organized by resource type.
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Authentication checks via the session extractors
//! - Business logic execution via database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`auth`]: Login, logout, and current-session retrieval
//! - [`rooms`]: Room CRUD, image replacement, and occupancy stats
//! - [`events`]: Event CRUD, slug lookup, and image ordering
//! - [`gallery`]: Gallery CRUD and the visibility toggle
//! - [`uploads`]: Multipart relay to the image CDN
//! - [`stats`]: Aggregate counts for the admin dashboard
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which automatically converts to
//! appropriate HTTP status codes and safe response messages.

pub mod auth;
pub mod events;
pub mod gallery;
pub mod rooms;
pub mod stats;
pub mod uploads;
