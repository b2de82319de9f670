// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle: sign-up, sign-in, sign-out and token renewal.
//!
//! Each user has at most one session record in the store, holding the
//! refresh token of the most recently issued pair:
//!
//! - sign-in creates (or overwrites) the record
//! - renew overwrites it, so the previous refresh token stops working at once
//! - sign-out deletes it
//!
//! Concurrent renewals for the same user are last-writer-wins. The caller
//! whose write lands first still gets a success response, but its refresh
//! token no longer matches the record and its next renewal is refused.

use crate::db::{RepositoryError, SessionStore, StoreError, UserRepository};
use crate::error::{AppError, Result};
use crate::models::user::USER_STATUS_ACTIVE;
use crate::models::{Role, SignUp, TokenClaims, TokenKind, TokenPair, User, UserResponse};
use crate::services::clock::Clock;
use crate::services::password::PasswordHasher;
use crate::services::tokens::{TokenError, TokenService};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use subtle::ConstantTimeEq;
use uuid::Uuid;
use validator::Validate;

const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Orchestrates token issuance, the session store and the user repository.
#[derive(Clone)]
pub struct SessionManager {
    tokens: TokenService,
    users: Arc<dyn UserRepository>,
    store: Arc<dyn SessionStore>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
    retry_backoff: Duration,
}

impl SessionManager {
    pub fn new(
        tokens: TokenService,
        users: Arc<dyn UserRepository>,
        store: Arc<dyn SessionStore>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tokens,
            users,
            store,
            hasher,
            clock,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Bound every store and repository call by `timeout`; a failed store
    /// call is retried once after `retry_backoff`.
    pub fn with_timeouts(mut self, timeout: Duration, retry_backoff: Duration) -> Self {
        self.store_timeout = timeout;
        self.retry_backoff = retry_backoff;
        self
    }

    // ─── Flows ───────────────────────────────────────────────────

    /// Register a new account. Creates no session.
    pub async fn sign_up(&self, request: &SignUp) -> Result<UserResponse> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let role: Role = request.user_role.parse()?;

        let password_hash = self
            .hasher
            .hash(&request.password)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("hashing password: {}", e)))?;

        let user = User {
            id: Uuid::new_v4(),
            created_at: crate::time_utils::format_unix_rfc3339(self.clock.now()),
            updated_at: None,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            email: request.email.clone(),
            password_hash,
            user_status: USER_STATUS_ACTIVE,
            user_role: role,
        };

        let created = self
            .repo_call(self.users.create(user))
            .await
            .map_err(|e| match e {
                RepositoryError::AlreadyExists(email) => {
                    AppError::AlreadyExists(format!("user with email {} already exists", email))
                }
                other => repository_failure("creating user", other),
            })?;

        tracing::info!(user_id = %created.id, role = %created.user_role, "User signed up");

        Ok(created.into())
    }

    /// Verify credentials and start a session.
    ///
    /// No tokens are returned unless the refresh token was recorded in the
    /// store: an unrecorded refresh token could never be renewed or revoked.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<TokenPair> {
        let user = match self.repo_call(self.users.find_by_email(email)).await {
            Ok(user) => user,
            Err(RepositoryError::NotFound) => {
                tracing::warn!("Sign-in for unknown email");
                return Err(AppError::unauthorized(AppError::BAD_CREDENTIALS));
            }
            Err(e) => return Err(repository_failure("looking up user by email", e)),
        };

        if !self.hasher.verify(&user.password_hash, password) {
            tracing::warn!(user_id = %user.id, "Sign-in with wrong password");
            return Err(AppError::unauthorized(AppError::BAD_CREDENTIALS));
        }

        let pair = self.start_session(&user).await?;
        tracing::info!(user_id = %user.id, "User signed in");
        Ok(pair)
    }

    /// End the session of the access token's subject. Idempotent, and the
    /// access token may already be expired.
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let claims = self
            .tokens
            .parse(access_token, TokenKind::Access)
            .map_err(invalid_token)?;

        self.store_call("deleting session", || self.store.delete(&claims.sub))
            .await?;

        tracing::info!(user_id = %claims.sub, "User signed out");
        Ok(())
    }

    /// Exchange a still-valid access token and an unexpired refresh token
    /// for a new pair.
    ///
    /// Renewal must happen before the access token lapses; after that the
    /// client has to sign in again. Capabilities are re-resolved from the
    /// user's current role, so role changes apply at the next renewal.
    pub async fn renew(&self, access_token: &str, refresh_token: &str) -> Result<TokenPair> {
        let now = self.clock.now();

        let access = self
            .tokens
            .parse(access_token, TokenKind::Access)
            .map_err(invalid_token)?;

        if !access.access_valid_at(now) {
            tracing::warn!(user_id = %access.sub, exp = access.exp, now, "Renewal with expired access token");
            return Err(AppError::unauthorized(AppError::ACCESS_EXPIRED));
        }

        let refresh = self
            .tokens
            .parse(refresh_token, TokenKind::Refresh)
            .map_err(invalid_token)?;

        if !refresh.refresh_valid_at(now) {
            tracing::warn!(user_id = %access.sub, exp = refresh.exp, now, "Renewal with expired refresh token");
            return Err(AppError::unauthorized(AppError::REFRESH_EXPIRED));
        }

        if refresh.sub != access.sub {
            tracing::warn!(user_id = %access.sub, "Renewal with refresh token of another subject");
            return Err(AppError::unauthorized(AppError::SESSION_ENDED));
        }

        let stored = self
            .store_call("reading session", || self.store.get(&access.sub))
            .await?;

        let current = stored
            .map(|s| bool::from(s.as_bytes().ct_eq(refresh_token.as_bytes())))
            .unwrap_or(false);
        if !current {
            tracing::warn!(user_id = %access.sub, "Renewal with superseded or signed-out session");
            return Err(AppError::unauthorized(AppError::SESSION_ENDED));
        }

        let user_id = Uuid::parse_str(&access.sub)
            .map_err(|_| AppError::unauthorized("token subject is not a user id"))?;

        let user = self
            .repo_call(self.users.find_by_id(user_id))
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => {
                    AppError::NotFound("user with the given ID is not found".to_string())
                }
                other => repository_failure("looking up user by id", other),
            })?;

        let pair = self.start_session(&user).await?;
        tracing::info!(user_id = %user.id, role = %user.user_role, "Tokens renewed");
        Ok(pair)
    }

    /// Claims of a currently valid access token.
    pub fn authenticate(&self, access_token: &str) -> Result<TokenClaims> {
        let claims = self
            .tokens
            .parse(access_token, TokenKind::Access)
            .map_err(invalid_token)?;

        if !claims.access_valid_at(self.clock.now()) {
            return Err(AppError::unauthorized("access token expired"));
        }

        Ok(claims)
    }

    // ─── Helpers ─────────────────────────────────────────────────

    /// Resolve credentials, mint a pair and record its refresh token.
    async fn start_session(&self, user: &User) -> Result<TokenPair> {
        let subject = user.id.to_string();
        let credentials = user.user_role.credentials();

        let pair = self
            .tokens
            .issue(&subject, credentials, self.clock.now())
            .map_err(|e| AppError::Signing(e.to_string()))?;

        self.store_call("persisting session", || self.store.put(&subject, &pair.refresh))
            .await?;

        Ok(pair)
    }

    /// Run a store operation with a timeout and one retry.
    async fn store_call<T, F, Fut>(&self, stage: &'static str, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<T, StoreError>>,
    {
        let mut retried = false;
        loop {
            let result = match tokio::time::timeout(self.store_timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Unavailable(format!(
                    "timed out after {:?}",
                    self.store_timeout
                ))),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if !retried => {
                    tracing::warn!(stage, error = %e, "Session store call failed, retrying once");
                    retried = true;
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(e) => return Err(AppError::StoreUnavailable(format!("{}: {}", stage, e))),
            }
        }
    }

    /// Run a repository operation with a timeout.
    async fn repo_call<T>(
        &self,
        op: impl Future<Output = std::result::Result<T, RepositoryError>>,
    ) -> std::result::Result<T, RepositoryError> {
        tokio::time::timeout(self.store_timeout, op)
            .await
            .unwrap_or_else(|_| {
                Err(RepositoryError::Unavailable(format!(
                    "timed out after {:?}",
                    self.store_timeout
                )))
            })
    }
}

fn invalid_token(err: TokenError) -> AppError {
    AppError::unauthorized(format!("invalid token: {}", err))
}

fn repository_failure(stage: &str, err: RepositoryError) -> AppError {
    AppError::RepositoryUnavailable(format!("{}: {}", stage, err))
}
