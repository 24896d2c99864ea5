//! API request/response models for authentication.

use crate::api::models::users::UserResponse;
use axum::{
    Json,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for logging in
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin@emall.local")]
    pub email: String,
    pub password: String,
}

/// Body returned on successful login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub message: String,
}

/// Body returned by auth endpoints that only report an outcome
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthSuccessResponse {
    pub message: String,
}

/// Login body plus the Set-Cookie header carrying the session token
#[derive(Debug)]
pub struct LoginResponse {
    pub auth_response: AuthResponse,
    pub cookie: String,
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        let mut response = Json(self.auth_response).into_response();
        match HeaderValue::from_str(&self.cookie) {
            Ok(value) => {
                response.headers_mut().insert(header::SET_COOKIE, value);
                response
            }
            Err(e) => crate::errors::Error::Internal {
                operation: format!("encode session cookie: {e}"),
            }
            .into_response(),
        }
    }
}

/// Logout body plus the Set-Cookie header that clears the session
#[derive(Debug)]
pub struct LogoutResponse {
    pub auth_response: AuthSuccessResponse,
    pub cookie: String,
}

impl IntoResponse for LogoutResponse {
    fn into_response(self) -> Response {
        let mut response = Json(self.auth_response).into_response();
        match HeaderValue::from_str(&self.cookie) {
            Ok(value) => {
                response.headers_mut().insert(header::SET_COOKIE, value);
                response
            }
            Err(e) => crate::errors::Error::Internal {
                operation: format!("encode session cookie: {e}"),
            }
            .into_response(),
        }
    }
}
