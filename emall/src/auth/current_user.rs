//! Request extractors for the authenticated admin session.

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

/// Extract user from JWT session cookie if present and valid
/// Returns:
/// - None: No JWT cookie present
/// - Some(Ok(user)): Valid JWT found and verified
/// - Some(Err(error)): JWT cookie present but invalid/malformed
#[instrument(skip(parts, config))]
fn try_jwt_session_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.auth.session.cookie_name;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name {
                // Try to verify the JWT session token
                match session::verify_session_token(value, config) {
                    Ok(user) => return Some(Ok(user)),
                    Err(_) => {
                        // Invalid/expired token, continue checking other cookies or return None
                        // We don't propagate JWT verification errors as they're expected for expired tokens
                        continue;
                    }
                }
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match try_jwt_session_auth(parts, &state.config) {
            Some(Ok(user)) => {
                debug!("Found JWT session authenticated user: {}", user.id);
                Ok(user)
            }
            Some(Err(e)) => {
                trace!("JWT session authentication failed: {:?}", e);
                Err(Error::Unauthenticated { message: None })
            }
            None => {
                trace!("No authentication credentials found in request");
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}

/// Wrapper for routes whose behaviour varies with authentication instead of
/// requiring it (e.g. `admin=true` listing switches).
#[derive(Debug, Clone)]
pub struct OptionalCurrentUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalCurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = match try_jwt_session_auth(parts, &state.config) {
            Some(Ok(user)) => Some(user),
            _ => None,
        };
        Ok(OptionalCurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::session::create_session_token, test_utils::create_test_config};
    use uuid::Uuid;

    fn test_state() -> AppState {
        let config = create_test_config();
        // The pool is lazy, nothing connects unless a query runs
        let pool = sqlx::postgres::PgPoolOptions::new().connect_lazy("postgres://localhost/emall_test").unwrap();
        AppState::builder()
            .db(pool)
            .storage(crate::test_utils::test_storage(&config))
            .config(config)
            .build()
    }

    fn parts_with_cookie(cookie: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(axum::http::header::COOKIE, cookie)
            .body(())
            .unwrap();
        let (parts, _body) = request.into_parts();
        parts
    }

    fn sample_user() -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn valid_session_cookie_authenticates() {
        let state = test_state();
        let user = sample_user();
        let token = create_session_token(&user, &state.config).unwrap();
        let cookie_name = &state.config.auth.session.cookie_name;

        let mut parts = parts_with_cookie(&format!("{cookie_name}={token}"));
        let extracted = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(extracted.id, user.id);
        assert_eq!(extracted.email, user.email);
    }

    #[tokio::test]
    async fn cookie_is_found_among_others() {
        let state = test_state();
        let user = sample_user();
        let token = create_session_token(&user, &state.config).unwrap();
        let cookie_name = &state.config.auth.session.cookie_name;

        let mut parts = parts_with_cookie(&format!("theme=dark; {cookie_name}={token}; lang=en"));
        let extracted = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(extracted.id, user.id);
    }

    #[tokio::test]
    async fn missing_cookie_is_unauthenticated() {
        let state = test_state();
        let request = axum::http::Request::builder().uri("http://localhost/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_unauthenticated() {
        let state = test_state();
        let cookie_name = &state.config.auth.session.cookie_name;

        let mut parts = parts_with_cookie(&format!("{cookie_name}=not.a.jwt"));
        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn optional_extractor_returns_none_instead_of_erroring() {
        let state = test_state();
        let request = axum::http::Request::builder().uri("http://localhost/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        let OptionalCurrentUser(user) = OptionalCurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn optional_extractor_returns_user_when_present() {
        let state = test_state();
        let user = sample_user();
        let token = create_session_token(&user, &state.config).unwrap();
        let cookie_name = &state.config.auth.session.cookie_name;

        let mut parts = parts_with_cookie(&format!("{cookie_name}={token}"));
        let OptionalCurrentUser(extracted) = OptionalCurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(extracted.unwrap().id, user.id);
    }
}
