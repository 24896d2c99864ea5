//! Session authentication endpoints.
//!
//! Login verifies the password, mints a JWT, and sets it as an HTTP-only
//! cookie. All failure modes of login (unknown email, account without a
//! password, wrong password) return the same 401 so the endpoint does not
//! leak which emails have accounts.

use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, AuthSuccessResponse, LoginRequest, LoginResponse, LogoutResponse},
        users::{CurrentUser, UserResponse},
    },
    auth::{password::verify_string, session::create_session_token},
    config::Config,
    errors::{Error, Result},
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Build the Set-Cookie value for a fresh session token
fn create_session_cookie(token: &str, config: &Config) -> String {
    let session = &config.auth.session;
    format!(
        "{name}={token}; Path=/; HttpOnly; Secure={secure}; SameSite={same_site}; Max-Age={max_age}",
        name = session.cookie_name,
        secure = session.cookie_secure,
        same_site = session.cookie_same_site,
        max_age = session.timeout.as_secs(),
    )
}

#[utoipa::path(
    post,
    path = "/authentication/login",
    tag = "authentication",
    summary = "Log in with email and password",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(login): Json<LoginRequest>) -> Result<LoginResponse> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = crate::db::handlers::Users::new(&mut conn);

    let user = users
        .get_user_by_email(&login.email)
        .await?
        .ok_or_else(|| Error::Unauthenticated {
            message: Some(INVALID_CREDENTIALS.to_string()),
        })?;

    let password_hash = user.password_hash.clone().ok_or_else(|| Error::Unauthenticated {
        message: Some(INVALID_CREDENTIALS.to_string()),
    })?;

    // Argon2 verification is CPU-bound, keep it off the async workers
    let password = login.password;
    let verified = tokio::task::spawn_blocking(move || verify_string(&password, &password_hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("password verification task: {e}"),
        })??;

    if !verified {
        return Err(Error::Unauthenticated {
            message: Some(INVALID_CREDENTIALS.to_string()),
        });
    }

    let current_user = CurrentUser {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
    };
    let token = create_session_token(&current_user, &state.config)?;
    let cookie = create_session_cookie(&token, &state.config);

    tracing::info!("User {} logged in", user.id);

    Ok(LoginResponse {
        auth_response: AuthResponse {
            user: UserResponse::from(user),
            message: "Login successful".to_string(),
        },
        cookie,
    })
}

#[utoipa::path(
    post,
    path = "/authentication/logout",
    tag = "authentication",
    summary = "Log out and clear the session cookie",
    responses(
        (status = 200, description = "Logged out", body = AuthSuccessResponse)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> LogoutResponse {
    // Expire the cookie immediately; the JWT itself stays valid until exp
    let cookie = format!(
        "{}=; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=0",
        state.config.auth.session.cookie_name
    );

    LogoutResponse {
        auth_response: AuthSuccessResponse {
            message: "Logged out".to_string(),
        },
        cookie,
    }
}

#[utoipa::path(
    get,
    path = "/authentication/me",
    tag = "authentication",
    summary = "Get the currently authenticated user",
    responses(
        (status = 200, description = "Current session user", body = CurrentUser),
        (status = 401, description = "Not authenticated")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn me(current_user: CurrentUser) -> Json<CurrentUser> {
    Json(current_user)
}

#[cfg(test)]
mod tests {
    use crate::{api::models::auth::AuthResponse, api::models::users::CurrentUser, test_utils::*};
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn login_sets_session_cookie_and_me_works(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_admin(&pool, "admin@example.com", "correct horse battery").await;

        let response = app
            .post("/authentication/login")
            .json(&json!({ "email": "admin@example.com", "password": "correct horse battery" }))
            .await;

        response.assert_status_ok();
        let body: AuthResponse = response.json();
        assert_eq!(body.user.email, "admin@example.com");
        assert!(response.header("set-cookie").to_str().unwrap().contains("HttpOnly"));

        // Cookie jar carries the session to the next request
        let response = app.get("/authentication/me").await;
        response.assert_status_ok();
        let me: CurrentUser = response.json();
        assert_eq!(me.id, admin.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn wrong_password_and_unknown_email_look_identical(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_admin(&pool, "admin@example.com", "right-password").await;

        let wrong = app
            .post("/authentication/login")
            .json(&json!({ "email": "admin@example.com", "password": "wrong-password" }))
            .await;
        wrong.assert_status(StatusCode::UNAUTHORIZED);

        let unknown = app
            .post("/authentication/login")
            .json(&json!({ "email": "ghost@example.com", "password": "whatever" }))
            .await;
        unknown.assert_status(StatusCode::UNAUTHORIZED);

        assert_eq!(wrong.text(), unknown.text());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn me_without_session_is_unauthorized(pool: PgPool) {
        let app = create_test_app(pool).await;
        app.get("/authentication/me").await.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn logout_clears_the_cookie(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_admin(&pool, "admin@example.com", "some-password").await;
        login(&app, "admin@example.com", "some-password").await;

        let response = app.post("/authentication/logout").await;
        response.assert_status_ok();
        let cookie = response.header("set-cookie");
        assert!(cookie.to_str().unwrap().contains("Max-Age=0"));

        // The jar now holds the expired cookie, the session is gone
        app.get("/authentication/me").await.assert_status(StatusCode::UNAUTHORIZED);
    }
}
