// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tokengate: access/refresh token sessions backed by a key-value store.
//!
//! This crate provides the auth API: sign-up, sign-in, sign-out and token
//! renewal, with one active session per user tracked in Redis.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::SessionManager;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionManager,
}
