// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tokengate API Server
//!
//! Issues and renews access/refresh token pairs and tracks the active
//! session of each user in Redis.

use std::sync::Arc;
use tokengate::{
    config::Config,
    db::{InMemoryUserRepository, RedisSessionStore},
    services::{Argon2Hasher, Clock, SessionManager, SystemClock, TokenService},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        access_ttl_secs = config.access_ttl.as_secs(),
        refresh_ttl_secs = config.refresh_ttl.as_secs(),
        "Starting Tokengate API"
    );

    // A key that cannot sign fails startup, not the first sign-in
    let tokens = TokenService::from_config(&config)?;
    tokens.self_check(SystemClock.now())?;
    tracing::info!("Token signing self-check passed");

    let store = RedisSessionStore::connect(
        &config.redis_url,
        &config.session_key_prefix,
        config.session_ttl,
    )
    .await?;

    // User persistence is an external collaborator; this binary keeps
    // accounts in memory until one is plugged in.
    tracing::warn!("Using in-memory user repository, accounts are lost on restart");
    let users = InMemoryUserRepository::new();

    let sessions = SessionManager::new(
        tokens,
        Arc::new(users),
        Arc::new(store),
        Arc::new(Argon2Hasher),
        Arc::new(SystemClock),
    )
    .with_timeouts(config.store_timeout, config.store_retry_backoff);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        sessions,
    });

    // Build router
    let app = tokengate::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tokengate=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
