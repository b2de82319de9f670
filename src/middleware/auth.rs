// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer-token authentication.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated user extracted from a valid access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    /// Access token expiry (Unix seconds)
    pub expires: i64,
    pub credentials: Vec<String>,
}

/// Middleware that requires a valid, unexpired access token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers().get(header::AUTHORIZATION))?;
    let claims = state.sessions.authenticate(token)?;

    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        expires: claims.exp,
        credentials: claims.credentials,
    });

    Ok(next.run(request).await)
}

/// Raw bearer token from the Authorization header, not yet verified.
///
/// Sign-out and renewal take the token this way because they must accept
/// access tokens that `require_auth` would turn away.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_bearer_token(parts.headers.get(header::AUTHORIZATION))
            .map(|token| BearerToken(token.to_string()))
    }
}

fn extract_bearer_token(auth_header: Option<&HeaderValue>) -> Result<&str, AppError> {
    let value = auth_header
        .ok_or_else(|| AppError::unauthorized("missing Authorization header"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("invalid Authorization header"))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Authorization header must be Bearer token"))?
        .trim();

    if token.is_empty() {
        return Err(AppError::unauthorized("Bearer token is empty"));
    }

    Ok(token)
}
