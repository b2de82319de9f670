// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Server-side variants carry internal text for the logs only; it is never
/// written to the response body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("role '{0}' does not exist")]
    UnknownRole(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("User repository unavailable: {0}")]
    RepositoryUnavailable(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Renewal rejected because the access token has lapsed.
    pub const ACCESS_EXPIRED: &'static str =
        "access token already expired, initiate full sign-in";
    /// Renewal rejected because the refresh token has lapsed.
    pub const REFRESH_EXPIRED: &'static str = "session ended, refresh token expired";
    /// Renewal rejected because the stored session no longer matches.
    pub const SESSION_ENDED: &'static str = "session ended, sign in again";
    /// Sign-in rejected; deliberately identical for unknown email and bad password.
    pub const BAD_CREDENTIALS: &'static str = "wrong user email address or password";

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        AppError::Unauthorized(reason.into())
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::UnknownRole(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) | AppError::RepositoryUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Signing(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True when the caller caused the failure (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, details) = match &self {
            AppError::Validation(msg) => ("validation_error", Some(msg.clone())),
            AppError::UnknownRole(_) => ("unknown_role", Some(self.to_string())),
            AppError::Unauthorized(reason) => ("unauthorized", Some(reason.clone())),
            AppError::NotFound(msg) => ("not_found", Some(msg.clone())),
            AppError::AlreadyExists(msg) => ("already_exists", Some(msg.clone())),
            AppError::StoreUnavailable(msg) => {
                tracing::error!(error = %msg, "Session store error");
                ("service_unavailable", None)
            }
            AppError::RepositoryUnavailable(msg) => {
                tracing::error!(error = %msg, "User repository error");
                ("service_unavailable", None)
            }
            AppError::Signing(msg) => {
                tracing::error!(error = %msg, "Token signing error");
                ("internal_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers and services
pub type Result<T> = std::result::Result<T, AppError>;
