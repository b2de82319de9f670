// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store: one record per user id holding the current refresh token.
//!
//! Records are written with a plain overwrite, so issuing a new pair for a
//! user silently invalidates whatever refresh token was stored before.

use async_trait::async_trait;
use dashmap::DashMap;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use std::sync::Arc;
use std::time::Duration;

/// Session store failure. Every variant means the store could not be reached
/// or did not answer; the caller must abort the flow.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value store for session records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Overwrite the record for `subject`.
    async fn put(&self, subject: &str, refresh_token: &str) -> Result<(), StoreError>;

    /// Current refresh token for `subject`, if a session exists.
    async fn get(&self, subject: &str) -> Result<Option<String>, StoreError>;

    /// Remove the record for `subject`. Removing an absent record is not an error.
    async fn delete(&self, subject: &str) -> Result<(), StoreError>;
}

// ─── Redis ───────────────────────────────────────────────────

/// Redis-backed session store.
///
/// Uses a [`ConnectionManager`], which multiplexes one connection across
/// requests and reconnects on its own after network failures.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
    key_prefix: String,
    ttl: Option<Duration>,
}

impl RedisSessionStore {
    /// Connect to Redis and verify the connection with a PING.
    pub async fn connect(
        url: &str,
        key_prefix: &str,
        ttl: Option<Duration>,
    ) -> Result<Self, StoreError> {
        let client = Client::open(url).map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let store = Self {
            conn,
            key_prefix: key_prefix.to_string(),
            ttl,
        };

        if !store.health_check().await? {
            return Err(StoreError::Unavailable("PING did not return PONG".to_string()));
        }

        tracing::info!(ttl_secs = ?ttl.map(|t| t.as_secs()), "Connected to session store");

        Ok(store)
    }

    /// Check that Redis answers.
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let result: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(result == "PONG")
    }

    fn key(&self, subject: &str) -> String {
        format!("{}{}", self.key_prefix, subject)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, subject: &str, refresh_token: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let key = self.key(subject);

        let result: redis::RedisResult<()> = match self.ttl {
            Some(ttl) => conn.set_ex(key, refresh_token, ttl.as_secs().max(1)).await,
            None => conn.set(key, refresh_token).await,
        };

        result.map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn get(&self, subject: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        conn.get(self.key(subject))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn delete(&self, subject: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .del(self.key(subject))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

// ─── In-memory ───────────────────────────────────────────────

/// In-process session store for tests and local development.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    records: Arc<DashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live session records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, subject: &str, refresh_token: &str) -> Result<(), StoreError> {
        self.records
            .insert(subject.to_string(), refresh_token.to_string());
        Ok(())
    }

    async fn get(&self, subject: &str) -> Result<Option<String>, StoreError> {
        Ok(self.records.get(subject).map(|r| r.value().clone()))
    }

    async fn delete(&self, subject: &str) -> Result<(), StoreError> {
        self.records.remove(subject);
        Ok(())
    }
}
