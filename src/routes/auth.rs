// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-up, sign-in, sign-out and token renewal routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::{AuthUser, BearerToken};
use crate::models::{Renew, SignIn, SignUp, TokenPair, UserResponse};
use crate::AppState;

/// Public auth routes. Sign-out and renewal verify the token themselves.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/auth/signup", post(sign_up))
        .route("/api/v1/auth/signin", post(sign_in))
        .route("/api/v1/auth/signout", post(sign_out))
        .route("/api/v1/token/renew", post(renew))
}

/// Routes behind `require_auth` (applied in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/v1/auth/session", get(current_session))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignUpResponse {
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokensResponse {
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user_id: String,
    pub expires: i64,
    pub credentials: Vec<String>,
}

/// Unwrap a JSON body, turning extractor rejections into our error shape.
fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Register a new user.
async fn sign_up(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SignUp>, JsonRejection>,
) -> Result<Json<SignUpResponse>> {
    let request = body(payload)?;
    let user = state.sessions.sign_up(&request).await?;
    Ok(Json(SignUpResponse { user }))
}

/// Authenticate and return a new token pair.
async fn sign_in(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SignIn>, JsonRejection>,
) -> Result<Json<TokensResponse>> {
    let request = body(payload)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let tokens = state
        .sessions
        .sign_in(&request.email, &request.password)
        .await?;
    Ok(Json(TokensResponse { tokens }))
}

/// Delete the caller's session.
async fn sign_out(
    State(state): State<Arc<AppState>>,
    BearerToken(access): BearerToken,
) -> Result<StatusCode> {
    state.sessions.sign_out(&access).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Exchange the current pair for a new one.
async fn renew(
    State(state): State<Arc<AppState>>,
    BearerToken(access): BearerToken,
    payload: std::result::Result<Json<Renew>, JsonRejection>,
) -> Result<Json<TokensResponse>> {
    let request = body(payload)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let tokens = state
        .sessions
        .renew(&access, &request.refresh_token)
        .await?;
    Ok(Json(TokensResponse { tokens }))
}

/// Describe the caller's access token.
async fn current_session(Extension(user): Extension<AuthUser>) -> Json<SessionResponse> {
    Json(SessionResponse {
        user_id: user.user_id,
        expires: user.expires,
        credentials: user.credentials,
    })
}
