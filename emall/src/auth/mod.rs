//! Session authentication for the admin back office.
//!
//! Admins log in via `/authentication/login` with email/password. The session
//! is an HS256 JWT carried in a secure, HTTP-only cookie; there is no role
//! model, any authenticated user is an admin.
//!
//! # Modules
//!
//! - [`current_user`]: Extractors for getting the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: JWT session token creation and verification
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use emall::api::models::users::CurrentUser;
//!
//! async fn protected_handler(user: CurrentUser) -> String {
//!     format!("Hello, {}!", user.username)
//! }
//! ```

pub mod current_user;
pub mod password;
pub mod session;
