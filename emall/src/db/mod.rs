//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL,
//! following the Repository pattern.
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations for CRUD operations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//!
//! # Transactions
//!
//! Repositories work with SQLx transactions to ensure ACID properties. For
//! multi-step writes (a room plus its images, say), create the repository
//! from a transaction rather than the pool:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let mut repo = Rooms::new(&mut tx);
//! // ... operations ...
//! tx.commit().await?;
//! ```
//!
//! # Migrations
//!
//! Database migrations are managed by SQLx and located in the `migrations/`
//! directory. The [`crate::migrator`] function provides access to the
//! migrator:
//!
//! ```ignore
//! emall::migrator().run(&pool).await?;
//! ```

pub mod errors;
pub mod handlers;
pub mod models;
