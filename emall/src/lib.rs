//! # emall: Mall Marketing Site Backend
//!
//! `emall` is the backend for a shopping mall's marketing site and its admin
//! back office. It serves a public read API for the marketing frontend
//! (vacant rooms, published events, the photo gallery) and a session-gated
//! admin API for managing the catalogue.
//!
//! ## Overview
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) with
//! PostgreSQL for persistence. Three content types make up the catalogue:
//!
//! - **Rooms**: rentable units grouped into blocks, each with a rent, a
//!   category, an occupancy status, and a set of images. The public site only
//!   ever sees vacant rooms.
//! - **Events**: mall events with a draft/published workflow. Published
//!   events are reachable by a slug derived from the title.
//! - **Gallery**: photos with a per-item visibility flag and free-form
//!   categories.
//!
//! Admins authenticate with email and password; a successful login sets an
//! HTTP-only cookie holding a signed JWT. Image uploads are relayed
//! server-side to the CDN so API credentials never reach the browser.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use emall::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = emall::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     emall::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The application requires a PostgreSQL database and automatically runs
//! migrations on startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! emall::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod slug;
pub mod storage;
pub mod telemetry;
mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    auth::password,
    config::CorsOrigin,
    db::handlers::Users,
    db::models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    openapi::ApiDoc,
    storage::ImageStorage,
};
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{
    Json, Router, http,
    routing::{delete, get, post, put},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{EventId, EventImageId, GalleryItemId, RoomId, RoomImageId, UserId};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .storage(storage)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub storage: Arc<dyn ImageStorage>,
}

/// Get the emall database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: called on every startup. An existing account keeps its row
/// and gets its password updated when one is configured, so a lost password
/// can be recovered by restarting with a new `admin_password`.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, password: Option<&str>, db: &PgPool) -> Result<UserId, anyhow::Error> {
    let password_hash = match password {
        Some(pwd) => Some(password::hash_string(pwd).map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?),
        None => None,
    };

    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    if let Some(existing_user) = user_repo.get_user_by_email(email).await? {
        if password_hash.is_some() {
            user_repo
                .update(
                    existing_user.id,
                    &UserUpdateDBRequest {
                        username: None,
                        password_hash,
                    },
                )
                .await?;
        }
        tx.commit().await?;
        return Ok(existing_user.id);
    }

    let created_user = user_repo
        .create(&UserCreateDBRequest {
            username: email.to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await?;

    tx.commit().await?;
    info!("Created initial admin user {}", created_user.id);
    Ok(created_user.id)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

    let mut origins = Vec::new();
    for origin in &cors_config.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(cors_config.allow_credentials)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::DELETE,
        ])
        .allow_headers([http::header::CONTENT_TYPE])
        .max_age(cors_config.max_age);

    if !cors_config.exposed_headers.is_empty() {
        let mut exposed = Vec::new();
        for name in &cors_config.exposed_headers {
            exposed.push(name.parse::<http::HeaderName>()?);
        }
        cors = cors.expose_headers(exposed);
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// Authentication routes live at the root so the frontend can share them
/// between deployments; everything else is under `/api/v1`.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let auth_routes = Router::new()
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/logout", post(api::handlers::auth::logout))
        .route("/authentication/me", get(api::handlers::auth::me))
        .with_state(state.clone());

    // Uploads carry whole image files, so that route gets a raised body limit
    let upload_limit = state.config.uploads.max_file_size as usize + 64 * 1024;
    let upload_routes = Router::new().route(
        "/upload",
        post(api::handlers::uploads::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
    );

    let api_routes = Router::new()
        // Rooms; /rooms/stats must be registered alongside /rooms/{id}
        .route("/rooms", get(api::handlers::rooms::list_rooms))
        .route("/rooms", post(api::handlers::rooms::create_room))
        .route("/rooms/stats", get(api::handlers::rooms::room_stats))
        .route("/rooms/{id}", get(api::handlers::rooms::get_room))
        .route("/rooms/{id}", put(api::handlers::rooms::update_room))
        .route("/rooms/{id}", delete(api::handlers::rooms::delete_room))
        // Events
        .route("/events", get(api::handlers::events::list_events))
        .route("/events", post(api::handlers::events::create_event))
        .route("/events/slug/{slug}", get(api::handlers::events::get_event_by_slug))
        .route("/events/{id}", get(api::handlers::events::get_event))
        .route("/events/{id}", put(api::handlers::events::update_event))
        .route("/events/{id}", delete(api::handlers::events::delete_event))
        // Gallery
        .route("/gallery", get(api::handlers::gallery::list_gallery))
        .route("/gallery", post(api::handlers::gallery::create_gallery_item))
        .route("/gallery/{id}", put(api::handlers::gallery::update_gallery_item))
        .route("/gallery/{id}", delete(api::handlers::gallery::delete_gallery_item))
        // Dashboard
        .route("/admin/stats", get(api::handlers::stats::admin_stats))
        .merge(upload_routes)
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .nest("/api/v1", api_routes)
        .merge(Scalar::with_url("/admin/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, and ensures the admin account exists
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting with configuration: {:#?}", config);

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database.pool.max_connections)
            .acquire_timeout(config.database.pool.acquire_timeout)
            .connect(&config.database.url)
            .await?;

        Self::new_with_pool(config, pool).await
    }

    /// Create an application on an existing pool (used by tests)
    pub async fn new_with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        migrator().run(&pool).await?;

        create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {e}"))?;

        let storage = storage::create_storage(&config.storage);

        let state = AppState::builder().db(pool.clone()).config(config.clone()).storage(storage).build();
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Listening on http://{}", bind_addr);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::create_initial_admin_user;
    use crate::{db::handlers::Users, test_utils::*};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn healthz_and_docs_are_served(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = app.get("/healthz").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "OK");

        let response = app.get("/api/v1/openapi.json").await;
        response.assert_status_ok();
        let spec: serde_json::Value = response.json();
        assert_eq!(spec["info"]["title"], "Emall API");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn initial_admin_user_is_idempotent(pool: PgPool) {
        let first = create_initial_admin_user("admin@emall.local", Some("first-password"), &pool).await.unwrap();
        let second = create_initial_admin_user("admin@emall.local", Some("second-password"), &pool).await.unwrap();
        assert_eq!(first, second);

        // Password rotates to the latest configured value
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        let user = users.get_user_by_email("admin@emall.local").await.unwrap().unwrap();
        let hash = user.password_hash.unwrap();
        assert!(crate::auth::password::verify_string("second-password", &hash).unwrap());
        assert!(!crate::auth::password::verify_string("first-password", &hash).unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn admin_user_without_password_cannot_login(pool: PgPool) {
        create_initial_admin_user("admin@emall.local", None, &pool).await.unwrap();
        let app = create_test_app(pool).await;

        let response = app
            .post("/authentication/login")
            .json(&serde_json::json!({ "email": "admin@emall.local", "password": "" }))
            .await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }
}
