//! Repository implementations for database access.
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Handles query construction and parameter binding
//! - Returns domain models from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Rooms`], [`Events`], [`Gallery`]: catalogue tables behind the
//!   [`Repository`] trait (rooms with image sets and occupancy stats, events
//!   with slug generation and ordered images, gallery items with the
//!   visibility toggle)
//! - [`Users`]: admin account provisioning and the login lookup; too narrow
//!   a surface to sit behind the trait
//!
//! # Common Pattern
//!
//! ```ignore
//! use emall::db::handlers::{Repository, Rooms};
//!
//! let mut tx = pool.begin().await?;
//! let mut repo = Rooms::new(&mut tx);
//! let room = repo.create(&create_request).await?;
//! tx.commit().await?;
//! ```

pub mod events;
pub mod gallery;
pub mod repository;
pub mod rooms;
pub mod users;

pub use events::Events;
pub use gallery::Gallery;
pub use repository::Repository;
pub use rooms::Rooms;
pub use users::Users;
