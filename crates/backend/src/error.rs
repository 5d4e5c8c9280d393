//! Error types for the session layer and its HTTP surface.
//!
//! `AuthError` is what the token codec, the hooks and the runtime return.
//! `ApiError` implements `IntoResponse` so handlers can use `?` and still
//! answer with an appropriate status code and a JSON body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::directory::DirectoryError;

/// Failures of the session layer.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Signing the claims failed (including an empty secret)
    #[error("Error encoding token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),

    /// Token is malformed, its signature does not verify, or it has expired
    #[error("Error decoding token: {0}")]
    Decoding(#[source] jsonwebtoken::errors::Error),

    /// Directory could not be queried for a user
    #[error("Error looking up user {email}: {source}")]
    DirectoryLookup {
        email: String,
        #[source]
        source: DirectoryError,
    },

    /// Directory refused or failed to create a user
    #[error("Error creating user {email}: {source}")]
    DirectoryCreate {
        email: String,
        #[source]
        source: DirectoryError,
    },

    /// Request carried neither an auth cookie nor a bearer token
    #[error("Missing authentication token")]
    MissingToken,

    /// Required configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Unified error type for API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Session layer error
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match &self {
            ApiError::Auth(AuthError::MissingToken) => (
                StatusCode::UNAUTHORIZED,
                "Missing authentication".to_string(),
                None,
            ),
            ApiError::Auth(AuthError::Decoding(_)) => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
                None,
            ),
            ApiError::Auth(AuthError::Config(msg)) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                    None,
                )
            }
            ApiError::Auth(e) => {
                tracing::error!("Auth error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication failed".to_string(),
                    Some(e.to_string()),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
