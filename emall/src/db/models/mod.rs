//! Database record models matching table schemas.
//!
//! Each model struct corresponds to a table row and derives `sqlx::FromRow`
//! for query results. The `*DBRequest` structs carry validated data into the
//! repositories; the `*DBResponse` structs come back out and convert into API
//! models via `From`.

pub mod events;
pub mod gallery;
pub mod rooms;
pub mod users;
