//! Shared helpers for integration tests.

use crate::{
    AppState, Config,
    auth::password::{Argon2Params, hash_string_with_params},
    db::handlers::Users,
    db::models::users::{UserCreateDBRequest, UserDBResponse},
    storage::ImageStorage,
};
use axum_test::{TestServer, TestServerConfig};
use sqlx::PgPool;
use std::sync::Arc;
use url::Url;

/// A config that validates, with predictable credentials for assertions.
///
/// `cookie_secure` is off because the test client talks plain HTTP.
pub fn create_test_config() -> Config {
    let mut config = Config {
        port: 0,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        admin_email: "admin@emall.local".to_string(),
        ..Default::default()
    };
    config.auth.session.cookie_secure = false;
    config.storage.cloud_name = "test-cloud".to_string();
    config.storage.api_key = "key123".to_string();
    config.storage.api_secret = "shh".to_string();
    config
}

pub fn test_storage(config: &Config) -> Arc<dyn ImageStorage> {
    crate::storage::create_storage(&config.storage)
}

/// Spin up a test server over the given pool, with a cookie jar so a login
/// carries over to subsequent requests.
pub async fn create_test_app(pool: PgPool) -> TestServer {
    create_test_app_with_config(pool, create_test_config()).await
}

/// Like [`create_test_app`] but with the storage backend pointed at a mock
/// server (usually wiremock).
pub async fn create_test_app_with_storage_url(pool: PgPool, base_url: &str) -> TestServer {
    let mut config = create_test_config();
    config.storage.base_url = Url::parse(base_url).expect("invalid mock storage url");
    create_test_app_with_config(pool, config).await
}

pub async fn create_test_app_with_config(pool: PgPool, config: Config) -> TestServer {
    let state = AppState::builder().db(pool).storage(test_storage(&config)).config(config).build();
    let router = crate::build_router(state).expect("Failed to build router");

    let server_config = TestServerConfig {
        save_cookies: true,
        ..Default::default()
    };
    TestServer::new_with_config(router, server_config).expect("Failed to create test server")
}

/// Create an admin account directly in the database.
///
/// Uses deliberately weak Argon2 parameters; hashing at production cost
/// makes the suite noticeably slower for no extra coverage.
pub async fn create_test_admin(pool: &PgPool, email: &str, password: &str) -> UserDBResponse {
    let params = Argon2Params {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };
    let password_hash = hash_string_with_params(password, Some(params)).expect("Failed to hash test password");

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users = Users::new(&mut conn);
    users
        .create(&UserCreateDBRequest {
            username: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: Some(password_hash),
        })
        .await
        .expect("Failed to create test admin")
}

/// Log in through the API so the server's cookie jar holds a session.
pub async fn login(app: &TestServer, email: &str, password: &str) {
    let response = app
        .post("/authentication/login")
        .json(&serde_json::json!({ "email": email, "password": password }))
        .await;
    response.assert_status_ok();
}
